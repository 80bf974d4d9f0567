use crate::application::error::ErrorReport;
use crate::application::report::ReportTaskInfo;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
    pub const REPORT: &str = "report_error";
    pub const REPORT_NOT_READY: &str = "report_not_ready";
    pub const SEED: &str = "seed_error";
}

const TOO_EARLY: u16 = 425;

fn too_early_status() -> StatusCode {
    StatusCode::from_u16(TOO_EARLY).unwrap_or(StatusCode::CONFLICT)
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn not_ready(task_status: &str) -> Self {
        Self::new(
            too_early_status(),
            codes::REPORT_NOT_READY,
            "Report is not ready",
            Some(task_status.to_string()),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 425 carrying the task state so clients can keep polling.
    pub fn too_early(info: &ReportTaskInfo) -> Response {
        let status = too_early_status();
        let mut response = (status, Json(info)).into_response();
        ErrorReport::from_message(
            "menu_catalog::infra::http::api::reports",
            status,
            format!(
                "{}: task={} status={}",
                codes::REPORT_NOT_READY,
                info.task_id,
                info.task_status.as_str()
            ),
        )
        .attach(&mut response);
        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let hint = self.hint.clone();
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "menu_catalog::infra::http::api",
            self.status,
            format!("{}: {}", self.code, hint.as_deref().unwrap_or(self.message)),
        )
        .attach(&mut response);
        response
    }
}
