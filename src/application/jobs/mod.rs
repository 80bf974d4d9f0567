mod context;
mod queue;
mod report;

pub use context::{ReportWorkerContext, job_failed};
pub use queue::enqueue_job;
pub use report::{
    EXPORT_MAX_ATTEMPTS, ExportError, ExportMenuReportJobPayload, enqueue_menu_report_job,
    process_menu_report_job,
};
