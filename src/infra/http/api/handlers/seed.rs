use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::seed::load_seed_file;

use super::seed_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::MessageResponse;
use crate::infra::http::api::state::ApiState;

pub async fn load_data(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    load_seed_file(&state.catalog, &state.seed_file)
        .await
        .map_err(seed_to_api)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Test DB data loaded".to_string(),
        }),
    ))
}
