//! API handlers organized by resource type.
//!
//! Error conversions shared by the resource modules live here.

mod dishes;
mod menus;
mod reports;
mod seed;
mod submenus;

pub use dishes::*;
pub use menus::*;
pub use reports::*;
pub use seed::*;
pub use submenus::*;

use axum::http::StatusCode;

use crate::application::catalog::CatalogError;
use crate::application::repos::RepoError;
use crate::application::report::ReportError;
use crate::application::seed::SeedError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

pub(crate) fn catalog_to_api(err: CatalogError) -> ApiError {
    match err {
        CatalogError::NotFound(kind) => ApiError::not_found(kind.not_found_message()),
        CatalogError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn report_to_api(err: ReportError) -> ApiError {
    match err {
        ReportError::NotFound => ApiError::not_found("report not found"),
        ReportError::NotReady(info) => ApiError::not_ready(info.task_status.as_str()),
        ReportError::Repo(repo) => repo_to_api(repo),
        ReportError::Storage(storage) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPORT,
            "Report file unavailable",
            Some(storage.to_string()),
        ),
    }
}

pub(crate) fn seed_to_api(err: SeedError) -> ApiError {
    match err {
        SeedError::Catalog(catalog) => catalog_to_api(catalog),
        SeedError::Io(io) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::SEED,
            "Seed file could not be read",
            Some(io.to_string()),
        ),
        SeedError::Parse(parse) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::SEED,
            "Seed file is malformed",
            Some(parse.to_string()),
        ),
    }
}
