use std::sync::Arc;

use apalis::prelude::Error as ApalisError;

use crate::{application::repos::ReportsRepo, infra::reports::ReportStorage};

/// Shared context passed to export workers.
#[derive(Clone)]
pub struct ReportWorkerContext {
    pub reports: Arc<dyn ReportsRepo>,
    pub storage: Arc<ReportStorage>,
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convert any error into an [`ApalisError::Failed`].
pub fn job_failed<E>(err: E) -> ApalisError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let boxed: BoxError = Box::new(err);
    ApalisError::Failed(Arc::new(boxed))
}
