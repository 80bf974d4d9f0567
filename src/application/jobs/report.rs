use apalis::prelude::{Data, Error as ApalisError};
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::{
        report::MenuReport,
        repos::{JobsRepo, RepoError, ReportOutcome},
    },
    domain::types::JobType,
    infra::{reports::ReportStorage, spreadsheet::write_menu_workbook},
};

use super::{
    context::{ReportWorkerContext, job_failed},
    queue::enqueue_job,
};

const TARGET: &str = "menu_catalog::jobs::export_menu_report";

/// Exports are not retried; a failed attempt settles the task as `failure`.
pub const EXPORT_MAX_ATTEMPTS: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMenuReportJobPayload {
    pub report_id: Uuid,
    pub menus: Vec<MenuReport>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet export failed: {0}")]
    Failed(String),
}

pub async fn enqueue_menu_report_job<J: JobsRepo + ?Sized>(
    repo: &J,
    payload: &ExportMenuReportJobPayload,
) -> Result<String, RepoError> {
    enqueue_job(
        repo,
        JobType::ExportMenuReport,
        payload,
        None,
        EXPORT_MAX_ATTEMPTS,
        0,
    )
    .await
}

/// Write the spreadsheet for a queued report and settle its status.
pub async fn process_menu_report_job(
    payload: ExportMenuReportJobPayload,
    context: Data<ReportWorkerContext>,
) -> Result<(), ApalisError> {
    let ctx = &*context;
    let ExportMenuReportJobPayload { report_id, menus } = payload;
    let file_name = ReportStorage::file_name_for(report_id);

    let existing = ctx.reports.find_report(report_id).await.map_err(job_failed)?;
    if let Some(record) = existing.filter(|record| record.status.is_finished()) {
        info!(
            target = TARGET,
            report_id = %report_id,
            status = record.status.as_str(),
            "report already settled, skipping"
        );
        return Ok(());
    }

    info!(
        target = TARGET,
        report_id = %report_id,
        menus = menus.len(),
        "starting export"
    );

    let outcome = match ctx.storage.absolute_path(&file_name) {
        Ok(path) => {
            match tokio::task::spawn_blocking(move || write_menu_workbook(&menus, &path)).await {
                Ok(Ok(())) => ReportOutcome::Success {
                    file_name: file_name.clone(),
                },
                Ok(Err(err)) => ReportOutcome::Failure {
                    error: err.to_string(),
                },
                Err(err) => ReportOutcome::Failure {
                    error: format!("export task aborted: {err}"),
                },
            }
        }
        Err(err) => ReportOutcome::Failure {
            error: err.to_string(),
        },
    };

    ctx.reports
        .complete_report(report_id, outcome.clone())
        .await
        .map_err(job_failed)?;

    match outcome {
        ReportOutcome::Success { file_name } => {
            counter!("catalog_report_generated_total").increment(1);
            info!(
                target = TARGET,
                report_id = %report_id,
                file = %file_name,
                "export completed"
            );
            Ok(())
        }
        ReportOutcome::Failure { error } => {
            counter!("catalog_report_failed_total").increment(1);
            error!(
                target = TARGET,
                report_id = %report_id,
                error = %error,
                "export failed"
            );
            Err(job_failed(ExportError::Failed(error)))
        }
    }
}
