//! Store-sourced menu reports and the export task lifecycle around them.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::application::jobs::{ExportMenuReportJobPayload, enqueue_menu_report_job};
use crate::application::repos::{CatalogRepo, JobsRepo, RepoError, ReportOutcome, ReportsRepo};
use crate::domain::entities::{MenuRecord, ReportRecord};
use crate::domain::types::ReportStatus;
use crate::infra::reports::{ReportStorage, ReportStorageError};

const TARGET: &str = "menu_catalog::reports";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuReport {
    pub title: String,
    pub description: String,
    pub submenus: Vec<SubmenuReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmenuReport {
    pub title: String,
    pub description: String,
    pub dishes: Vec<DishReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishReport {
    pub title: String,
    pub description: String,
    pub price: String,
}

/// Flatten loaded menu trees into the nested report shape.
pub fn assemble_report(menus: &[MenuRecord]) -> Vec<MenuReport> {
    menus
        .iter()
        .map(|menu| MenuReport {
            title: menu.title.clone(),
            description: menu.description.clone(),
            submenus: menu
                .submenus
                .iter()
                .map(|submenu| SubmenuReport {
                    title: submenu.title.clone(),
                    description: submenu.description.clone(),
                    dishes: submenu
                        .dishes
                        .iter()
                        .map(|dish| DishReport {
                            title: dish.title.clone(),
                            description: dish.description.clone(),
                            price: dish.price.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Polling view of an export task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTaskInfo {
    pub task_id: Uuid,
    pub task_status: ReportStatus,
    pub task_result: Option<String>,
}

impl From<&ReportRecord> for ReportTaskInfo {
    fn from(record: &ReportRecord) -> Self {
        let task_result = match record.status {
            ReportStatus::Pending => None,
            ReportStatus::Success => record.file_name.clone(),
            ReportStatus::Failure => record.error.clone(),
        };
        Self {
            task_id: record.id,
            task_status: record.status,
            task_result,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report not found")]
    NotFound,
    #[error("report is not ready")]
    NotReady(ReportTaskInfo),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Storage(#[from] ReportStorageError),
}

pub struct ReportService {
    menus: Arc<dyn CatalogRepo<MenuRecord>>,
    reports: Arc<dyn ReportsRepo>,
    jobs: Arc<dyn JobsRepo>,
    storage: Arc<ReportStorage>,
    store_timeout: Duration,
}

impl ReportService {
    pub fn new(
        menus: Arc<dyn CatalogRepo<MenuRecord>>,
        reports: Arc<dyn ReportsRepo>,
        jobs: Arc<dyn JobsRepo>,
        storage: Arc<ReportStorage>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            menus,
            reports,
            jobs,
            storage,
            store_timeout,
        }
    }

    /// Current truth from the store; the cache is never consulted.
    pub async fn menus_report(&self) -> Result<Vec<MenuReport>, ReportError> {
        let menus = tokio::time::timeout(self.store_timeout, self.menus.list(None))
            .await
            .map_err(|_| RepoError::Timeout)??;
        Ok(assemble_report(&menus))
    }

    /// Record a pending task and queue the spreadsheet export.
    pub async fn submit(&self) -> Result<ReportTaskInfo, ReportError> {
        let menus = self.menus_report().await?;
        let report_id = Uuid::new_v4();
        let record = self.reports.create_report(report_id).await?;

        let payload = ExportMenuReportJobPayload { report_id, menus };
        if let Err(err) = enqueue_menu_report_job(self.jobs.as_ref(), &payload).await {
            error!(
                target = TARGET,
                report_id = %report_id,
                error = %err,
                "failed to enqueue export job"
            );
            self.reports
                .complete_report(
                    report_id,
                    ReportOutcome::Failure {
                        error: err.to_string(),
                    },
                )
                .await?;
            return Err(err.into());
        }

        info!(
            target = TARGET,
            report_id = %report_id,
            menus = payload.menus.len(),
            "export queued"
        );
        Ok(ReportTaskInfo::from(&record))
    }

    pub async fn task_info(&self, report_id: Uuid) -> Result<ReportTaskInfo, ReportError> {
        let record = self
            .reports
            .find_report(report_id)
            .await?
            .ok_or(ReportError::NotFound)?;
        Ok(ReportTaskInfo::from(&record))
    }

    /// Bytes of a finished spreadsheet; anything else is `NotReady`.
    pub async fn download(&self, report_id: Uuid) -> Result<Vec<u8>, ReportError> {
        let record = self
            .reports
            .find_report(report_id)
            .await?
            .ok_or(ReportError::NotFound)?;

        match (&record.status, &record.file_name) {
            (ReportStatus::Success, Some(file_name)) => Ok(self.storage.read(file_name).await?),
            _ => Err(ReportError::NotReady(ReportTaskInfo::from(&record))),
        }
    }
}
