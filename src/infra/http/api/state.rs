use std::path::PathBuf;
use std::sync::Arc;

use crate::application::catalog::CatalogService;
use crate::application::report::ReportService;

#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<CatalogService>,
    pub reports: Arc<ReportService>,
    /// Document applied by `POST /api/v1/load_data`.
    pub seed_file: Arc<PathBuf>,
    /// File name offered to clients downloading a finished report.
    pub download_name: Arc<str>,
}
