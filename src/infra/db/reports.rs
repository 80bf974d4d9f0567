use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{RepoError, ReportOutcome, ReportsRepo},
    domain::{entities::ReportRecord, types::ReportStatus},
};

use super::{PostgresRepositories, map_sqlx_error};

const REPORT_COLUMNS: &str = "id, status, file_name, error, created_at, finished_at";

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    status: String,
    file_name: Option<String>,
    error: Option<String>,
    created_at: OffsetDateTime,
    finished_at: Option<OffsetDateTime>,
}

impl TryFrom<ReportRow> for ReportRecord {
    type Error = RepoError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let status = ReportStatus::try_from(row.status.as_str()).map_err(|_| {
            RepoError::from_persistence(format!("unknown report status `{}`", row.status))
        })?;

        Ok(Self {
            id: row.id,
            status,
            file_name: row.file_name,
            error: row.error,
            created_at: row.created_at,
            finished_at: row.finished_at,
        })
    }
}

#[async_trait]
impl ReportsRepo for PostgresRepositories {
    async fn create_report(&self, id: Uuid) -> Result<ReportRecord, RepoError> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "INSERT INTO menu_reports (id, status) VALUES ($1, $2) RETURNING {REPORT_COLUMNS}"
        ))
        .bind(id)
        .bind(ReportStatus::Pending.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        ReportRecord::try_from(row)
    }

    async fn find_report(&self, id: Uuid) -> Result<Option<ReportRecord>, RepoError> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM menu_reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(ReportRecord::try_from).transpose()
    }

    async fn complete_report(&self, id: Uuid, outcome: ReportOutcome) -> Result<(), RepoError> {
        let (status, file_name, error) = match outcome {
            ReportOutcome::Success { file_name } => (ReportStatus::Success, Some(file_name), None),
            ReportOutcome::Failure { error } => (ReportStatus::Failure, None, Some(error)),
        };

        let result = sqlx::query(
            r#"
            UPDATE menu_reports
               SET status = $2,
                   file_name = $3,
                   error = $4,
                   finished_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(file_name)
        .bind(error)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
