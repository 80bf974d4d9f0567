//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    DishPatch, DishRecord, MenuPatch, MenuRecord, NewDish, NewMenu, NewSubmenu, ReportRecord,
    SubmenuPatch, SubmenuRecord,
};
use crate::domain::types::{EntityKind, JobType};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn missing_parent(kind: EntityKind) -> Self {
        Self::InvalidInput {
            message: format!("{kind} requires a parent id"),
        }
    }
}

/// A persisted catalog entity that a generic store adapter can manage.
pub trait CatalogRecord: Clone + Send + Sync + 'static {
    type Draft: Send + 'static;
    type Patch: Send + 'static;

    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    /// Owning entity id; `None` for root records.
    fn parent_id(&self) -> Option<Uuid>;
}

impl CatalogRecord for MenuRecord {
    type Draft = NewMenu;
    type Patch = MenuPatch;

    const KIND: EntityKind = EntityKind::Menu;

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        None
    }
}

impl CatalogRecord for SubmenuRecord {
    type Draft = NewSubmenu;
    type Patch = SubmenuPatch;

    const KIND: EntityKind = EntityKind::Submenu;

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.menu_id)
    }
}

impl CatalogRecord for DishRecord {
    type Draft = NewDish;
    type Patch = DishPatch;

    const KIND: EntityKind = EntityKind::Dish;

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        Some(self.submenu_id)
    }
}

/// Store adapter for one level of the catalog.
///
/// Menu and submenu reads return the record with its full subtree loaded.
/// Deleting a menu or submenu removes every descendant in the same transaction.
#[async_trait]
pub trait CatalogRepo<R: CatalogRecord>: Send + Sync {
    /// Records owned by `parent`, or all root records when `parent` is `None`.
    async fn list(&self, parent: Option<Uuid>) -> Result<Vec<R>, RepoError>;

    async fn find(&self, id: Uuid) -> Result<Option<R>, RepoError>;

    async fn create(&self, parent: Option<Uuid>, draft: R::Draft) -> Result<R, RepoError>;

    /// Fails with [`RepoError::NotFound`] when `id` does not exist.
    async fn update(&self, id: Uuid, patch: R::Patch) -> Result<R, RepoError>;

    /// Fails with [`RepoError::NotFound`] when `id` does not exist.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Success { file_name: String },
    Failure { error: String },
}

#[async_trait]
pub trait ReportsRepo: Send + Sync {
    async fn create_report(&self, id: Uuid) -> Result<ReportRecord, RepoError>;

    async fn find_report(&self, id: Uuid) -> Result<Option<ReportRecord>, RepoError>;

    async fn complete_report(&self, id: Uuid, outcome: ReportOutcome) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct NewJobRecord {
    pub job_type: JobType,
    pub payload: serde_json::Value,
    pub run_at: OffsetDateTime,
    pub max_attempts: i32,
    pub priority: i32,
}

#[async_trait]
pub trait JobsRepo: Send + Sync {
    async fn enqueue_job(&self, job: NewJobRecord) -> Result<String, RepoError>;
}
