//! Report export handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::report::ReportError;
use crate::infra::spreadsheet::XLSX_CONTENT_TYPE;

use super::report_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;

pub async fn submit_menus_report(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let info = state.reports.submit().await.map_err(report_to_api)?;
    Ok((StatusCode::ACCEPTED, Json(info)))
}

pub async fn menus_report_status(
    State(state): State<ApiState>,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let info = state
        .reports
        .task_info(task_id)
        .await
        .map_err(report_to_api)?;
    Ok(Json(info))
}

pub async fn download_menus_report(
    State(state): State<ApiState>,
    Path(task_id): Path<Uuid>,
) -> Response {
    match state.reports.download(task_id).await {
        Ok(bytes) => {
            let disposition = format!("attachment; filename=\"{}\"", state.download_name);
            let mut response = (StatusCode::OK, bytes).into_response();
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(XLSX_CONTENT_TYPE),
            );
            if let Ok(value) = HeaderValue::from_str(&disposition) {
                headers.insert(header::CONTENT_DISPOSITION, value);
            }
            response
        }
        Err(ReportError::NotReady(info)) => ApiError::too_early(&info),
        Err(err) => report_to_api(err).into_response(),
    }
}
