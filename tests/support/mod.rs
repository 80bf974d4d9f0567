//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use menu_catalog::application::catalog::CatalogService;
use menu_catalog::application::report::ReportService;
use menu_catalog::application::repos::{
    CatalogRepo, JobsRepo, NewJobRecord, RepoError, ReportOutcome, ReportsRepo,
};
use menu_catalog::cache::{CacheConfig, CacheError, CacheStore, MemoryCache, SnapshotCache};
use menu_catalog::domain::entities::{
    DishPatch, DishRecord, MenuPatch, MenuRecord, NewDish, NewMenu, NewSubmenu, ReportRecord,
    SubmenuPatch, SubmenuRecord,
};
use menu_catalog::domain::types::{EntityKind, ReportStatus};
use menu_catalog::infra::reports::ReportStorage;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct MenuRow {
    id: Uuid,
    title: String,
    description: String,
}

#[derive(Debug, Clone)]
struct SubmenuRow {
    id: Uuid,
    menu_id: Uuid,
    title: String,
    description: String,
}

#[derive(Default)]
struct Tables {
    menus: Vec<MenuRow>,
    submenus: Vec<SubmenuRow>,
    dishes: Vec<DishRecord>,
    reports: HashMap<Uuid, ReportRecord>,
}

impl Tables {
    fn submenu(&self, row: &SubmenuRow) -> SubmenuRecord {
        SubmenuRecord {
            id: row.id,
            menu_id: row.menu_id,
            title: row.title.clone(),
            description: row.description.clone(),
            dishes: self
                .dishes
                .iter()
                .filter(|dish| dish.submenu_id == row.id)
                .cloned()
                .collect(),
        }
    }

    fn menu(&self, row: &MenuRow) -> MenuRecord {
        MenuRecord {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            submenus: self
                .submenus
                .iter()
                .filter(|submenu| submenu.menu_id == row.id)
                .map(|submenu| self.submenu(submenu))
                .collect(),
        }
    }

    fn remove_submenus(&mut self, doomed: &[Uuid]) {
        self.dishes.retain(|dish| !doomed.contains(&dish.submenu_id));
        self.submenus.retain(|submenu| !doomed.contains(&submenu.id));
    }
}

/// Store double with cascade semantics, read counting and an optional stall.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    reads: AtomicUsize,
    stalled: AtomicBool,
    fail_enqueue: AtomicBool,
    fail_delete: AtomicBool,
    jobs: Mutex<Vec<NewJobRecord>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of list/find calls that reached the store.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every subsequent call hang until the caller gives up.
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    pub fn fail_enqueue(&self) {
        self.fail_enqueue.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent delete fail without touching the tables.
    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    fn check_delete(&self) -> Result<(), RepoError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("delete rejected"));
        }
        Ok(())
    }

    pub async fn jobs(&self) -> Vec<NewJobRecord> {
        self.jobs.lock().await.clone()
    }

    pub async fn report_statuses(&self) -> Vec<ReportStatus> {
        let tables = self.tables.lock().await;
        tables.reports.values().map(|report| report.status).collect()
    }

    pub async fn row_counts(&self) -> (usize, usize, usize) {
        let tables = self.tables.lock().await;
        (
            tables.menus.len(),
            tables.submenus.len(),
            tables.dishes.len(),
        )
    }

    async fn enter(&self, read: bool) {
        if read {
            self.reads.fetch_add(1, Ordering::SeqCst);
        }
        if self.stalled.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }
}

#[async_trait]
impl CatalogRepo<MenuRecord> for MemoryStore {
    async fn list(&self, _parent: Option<Uuid>) -> Result<Vec<MenuRecord>, RepoError> {
        self.enter(true).await;
        let tables = self.tables.lock().await;
        Ok(tables.menus.iter().map(|row| tables.menu(row)).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError> {
        self.enter(true).await;
        let tables = self.tables.lock().await;
        Ok(tables
            .menus
            .iter()
            .find(|row| row.id == id)
            .map(|row| tables.menu(row)))
    }

    async fn create(&self, _parent: Option<Uuid>, draft: NewMenu) -> Result<MenuRecord, RepoError> {
        self.enter(false).await;
        let mut tables = self.tables.lock().await;
        let row = MenuRow {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
        };
        tables.menus.push(row.clone());
        Ok(tables.menu(&row))
    }

    async fn update(&self, id: Uuid, patch: MenuPatch) -> Result<MenuRecord, RepoError> {
        self.enter(false).await;
        let mut tables = self.tables.lock().await;
        let row = tables
            .menus
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        let row = row.clone();
        Ok(tables.menu(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.enter(false).await;
        self.check_delete()?;
        let mut tables = self.tables.lock().await;
        if !tables.menus.iter().any(|row| row.id == id) {
            return Err(RepoError::NotFound);
        }
        let doomed: Vec<Uuid> = tables
            .submenus
            .iter()
            .filter(|submenu| submenu.menu_id == id)
            .map(|submenu| submenu.id)
            .collect();
        tables.remove_submenus(&doomed);
        tables.menus.retain(|row| row.id != id);
        Ok(())
    }
}

#[async_trait]
impl CatalogRepo<SubmenuRecord> for MemoryStore {
    async fn list(&self, parent: Option<Uuid>) -> Result<Vec<SubmenuRecord>, RepoError> {
        self.enter(true).await;
        let menu_id = parent.ok_or_else(|| RepoError::missing_parent(EntityKind::Submenu))?;
        let tables = self.tables.lock().await;
        Ok(tables
            .submenus
            .iter()
            .filter(|row| row.menu_id == menu_id)
            .map(|row| tables.submenu(row))
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<SubmenuRecord>, RepoError> {
        self.enter(true).await;
        let tables = self.tables.lock().await;
        Ok(tables
            .submenus
            .iter()
            .find(|row| row.id == id)
            .map(|row| tables.submenu(row)))
    }

    async fn create(
        &self,
        parent: Option<Uuid>,
        draft: NewSubmenu,
    ) -> Result<SubmenuRecord, RepoError> {
        self.enter(false).await;
        let menu_id = parent.ok_or_else(|| RepoError::missing_parent(EntityKind::Submenu))?;
        let mut tables = self.tables.lock().await;
        if !tables.menus.iter().any(|row| row.id == menu_id) {
            return Err(RepoError::InvalidInput {
                message: "menu does not exist".into(),
            });
        }
        let row = SubmenuRow {
            id: Uuid::new_v4(),
            menu_id,
            title: draft.title,
            description: draft.description,
        };
        tables.submenus.push(row.clone());
        Ok(tables.submenu(&row))
    }

    async fn update(&self, id: Uuid, patch: SubmenuPatch) -> Result<SubmenuRecord, RepoError> {
        self.enter(false).await;
        let mut tables = self.tables.lock().await;
        let row = tables
            .submenus
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        let row = row.clone();
        Ok(tables.submenu(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.enter(false).await;
        self.check_delete()?;
        let mut tables = self.tables.lock().await;
        if !tables.submenus.iter().any(|row| row.id == id) {
            return Err(RepoError::NotFound);
        }
        tables.remove_submenus(&[id]);
        Ok(())
    }
}

#[async_trait]
impl CatalogRepo<DishRecord> for MemoryStore {
    async fn list(&self, parent: Option<Uuid>) -> Result<Vec<DishRecord>, RepoError> {
        self.enter(true).await;
        let submenu_id = parent.ok_or_else(|| RepoError::missing_parent(EntityKind::Dish))?;
        let tables = self.tables.lock().await;
        Ok(tables
            .dishes
            .iter()
            .filter(|dish| dish.submenu_id == submenu_id)
            .cloned()
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<DishRecord>, RepoError> {
        self.enter(true).await;
        let tables = self.tables.lock().await;
        Ok(tables.dishes.iter().find(|dish| dish.id == id).cloned())
    }

    async fn create(&self, parent: Option<Uuid>, draft: NewDish) -> Result<DishRecord, RepoError> {
        self.enter(false).await;
        let submenu_id = parent.ok_or_else(|| RepoError::missing_parent(EntityKind::Dish))?;
        let mut tables = self.tables.lock().await;
        if !tables.submenus.iter().any(|row| row.id == submenu_id) {
            return Err(RepoError::InvalidInput {
                message: "submenu does not exist".into(),
            });
        }
        let dish = DishRecord {
            id: Uuid::new_v4(),
            submenu_id,
            title: draft.title,
            description: draft.description,
            price: draft.price,
        };
        tables.dishes.push(dish.clone());
        Ok(dish)
    }

    async fn update(&self, id: Uuid, patch: DishPatch) -> Result<DishRecord, RepoError> {
        self.enter(false).await;
        let mut tables = self.tables.lock().await;
        let dish = tables
            .dishes
            .iter_mut()
            .find(|dish| dish.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(title) = patch.title {
            dish.title = title;
        }
        if let Some(description) = patch.description {
            dish.description = description;
        }
        if let Some(price) = patch.price {
            dish.price = price;
        }
        Ok(dish.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.enter(false).await;
        self.check_delete()?;
        let mut tables = self.tables.lock().await;
        let before = tables.dishes.len();
        tables.dishes.retain(|dish| dish.id != id);
        if tables.dishes.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ReportsRepo for MemoryStore {
    async fn create_report(&self, id: Uuid) -> Result<ReportRecord, RepoError> {
        let record = ReportRecord {
            id,
            status: ReportStatus::Pending,
            file_name: None,
            error: None,
            created_at: OffsetDateTime::now_utc(),
            finished_at: None,
        };
        self.tables.lock().await.reports.insert(id, record.clone());
        Ok(record)
    }

    async fn find_report(&self, id: Uuid) -> Result<Option<ReportRecord>, RepoError> {
        Ok(self.tables.lock().await.reports.get(&id).cloned())
    }

    async fn complete_report(&self, id: Uuid, outcome: ReportOutcome) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        let record = tables.reports.get_mut(&id).ok_or(RepoError::NotFound)?;
        match outcome {
            ReportOutcome::Success { file_name } => {
                record.status = ReportStatus::Success;
                record.file_name = Some(file_name);
            }
            ReportOutcome::Failure { error } => {
                record.status = ReportStatus::Failure;
                record.error = Some(error);
            }
        }
        record.finished_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }
}

#[async_trait]
impl JobsRepo for MemoryStore {
    async fn enqueue_job(&self, job: NewJobRecord) -> Result<String, RepoError> {
        if self.fail_enqueue.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("queue unavailable"));
        }
        let mut jobs = self.jobs.lock().await;
        jobs.push(job);
        Ok(format!("job-{}", jobs.len()))
    }
}

/// Backend that rejects every call.
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }
}

pub fn catalog_with(
    store: &Arc<MemoryStore>,
    cache: Arc<dyn CacheStore>,
    store_timeout: Duration,
) -> CatalogService {
    CatalogService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        SnapshotCache::new(cache, CacheConfig::default()),
        store_timeout,
    )
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub catalog: Arc<CatalogService>,
}

pub fn harness() -> Harness {
    let store = MemoryStore::new();
    let cache = Arc::new(MemoryCache::default());
    let catalog = Arc::new(catalog_with(&store, cache.clone(), STORE_TIMEOUT));
    Harness {
        store,
        cache,
        catalog,
    }
}

pub fn report_service(store: &Arc<MemoryStore>, storage: Arc<ReportStorage>) -> ReportService {
    ReportService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        storage,
        STORE_TIMEOUT,
    )
}
