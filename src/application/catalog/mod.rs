//! Cached CRUD over the menu → submenu → dish hierarchy.

mod crud;
mod service;

pub use crud::{CachedCrud, Projection};
pub use service::CatalogService;

use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::types::EntityKind;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(EntityKind),
    #[error(transparent)]
    Repo(#[from] RepoError),
}
