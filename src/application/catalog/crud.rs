use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::repos::{CatalogRecord, CatalogRepo, RepoError};
use crate::cache::{CacheKey, SnapshotCache};

use super::CatalogError;

const TARGET: &str = "menu_catalog::catalog";

/// Derives the cached read shape from a loaded record.
pub type Projection<R, V> = fn(&R) -> V;

/// Read-through, write-invalidate coordination of one entity kind.
///
/// Reads try the cache first and populate it with the projected shape on a
/// miss. Writes go to the store first (deletes invalidate first), then drop
/// every cache entry whose content the write made stale. Keys supplied by the
/// caller in `related` cover entries owned by other kinds, such as ancestor
/// counts.
pub struct CachedCrud<R: CatalogRecord, V> {
    repo: Arc<dyn CatalogRepo<R>>,
    cache: SnapshotCache,
    project: Projection<R, V>,
    store_timeout: Duration,
    _view: PhantomData<fn() -> V>,
}

impl<R, V> CachedCrud<R, V>
where
    R: CatalogRecord,
    V: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(
        repo: Arc<dyn CatalogRepo<R>>,
        cache: SnapshotCache,
        project: Projection<R, V>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            cache,
            project,
            store_timeout,
            _view: PhantomData,
        }
    }

    pub async fn list(&self, parent: Option<Uuid>) -> Result<Vec<V>, CatalogError> {
        let key = CacheKey::list(R::KIND, parent);
        if let Some(cached) = self.cache.fetch::<Vec<V>>(&key).await {
            return Ok(cached);
        }

        let records = self.store(self.repo.list(parent)).await?;
        let views: Vec<V> = records.iter().map(self.project).collect();
        self.cache.put(&key, &views).await;
        Ok(views)
    }

    pub async fn get(&self, id: Uuid) -> Result<V, CatalogError> {
        let key = CacheKey::item(R::KIND, id);
        if let Some(cached) = self.cache.fetch::<V>(&key).await {
            return Ok(cached);
        }

        let record = self
            .store(self.repo.find(id))
            .await?
            .ok_or(CatalogError::NotFound(R::KIND))?;
        let view = (self.project)(&record);
        self.cache.put(&key, &view).await;
        Ok(view)
    }

    /// Store-sourced record with its subtree, bypassing the cache.
    pub async fn load(&self, id: Uuid) -> Result<Option<R>, CatalogError> {
        self.store(self.repo.find(id)).await
    }

    pub async fn create(
        &self,
        parent: Option<Uuid>,
        draft: R::Draft,
        related: &[CacheKey],
    ) -> Result<V, CatalogError> {
        let record = self.store(self.repo.create(parent, draft)).await?;
        let view = (self.project)(&record);

        let mut stale = Vec::with_capacity(related.len() + 1);
        stale.push(CacheKey::list(R::KIND, record.parent_id()));
        stale.extend_from_slice(related);
        self.cache.invalidate(&stale).await;
        self.cache
            .put(&CacheKey::item(R::KIND, record.id()), &view)
            .await;

        debug!(
            target = TARGET,
            kind = R::KIND.as_str(),
            id = %record.id(),
            invalidated = stale.len(),
            "created"
        );
        Ok(view)
    }

    /// Counts never change on update, so only the kind's own list goes stale.
    pub async fn update(&self, id: Uuid, patch: R::Patch) -> Result<V, CatalogError> {
        let record = self.store(self.repo.update(id, patch)).await?;
        let view = (self.project)(&record);

        self.cache.put(&CacheKey::item(R::KIND, id), &view).await;
        self.cache
            .invalidate(&[CacheKey::list(R::KIND, record.parent_id())])
            .await;

        debug!(target = TARGET, kind = R::KIND.as_str(), id = %id, "updated");
        Ok(view)
    }

    /// Invalidates before touching the store, whatever the store outcome.
    pub async fn delete(
        &self,
        id: Uuid,
        parent: Option<Uuid>,
        related: &[CacheKey],
    ) -> Result<(), CatalogError> {
        let mut stale = Vec::with_capacity(related.len() + 2);
        stale.push(CacheKey::item(R::KIND, id));
        stale.push(CacheKey::list(R::KIND, parent));
        stale.extend_from_slice(related);
        self.cache.invalidate(&stale).await;

        self.store(self.repo.delete(id)).await?;

        debug!(
            target = TARGET,
            kind = R::KIND.as_str(),
            id = %id,
            invalidated = stale.len(),
            "deleted"
        );
        Ok(())
    }

    async fn store<T>(
        &self,
        operation: impl Future<Output = Result<T, RepoError>>,
    ) -> Result<T, CatalogError> {
        match tokio::time::timeout(self.store_timeout, operation).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(RepoError::NotFound)) => Err(CatalogError::NotFound(R::KIND)),
            Ok(Err(err)) => Err(CatalogError::Repo(err)),
            Err(_) => {
                warn!(
                    target = TARGET,
                    kind = R::KIND.as_str(),
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "store call timed out"
                );
                Err(CatalogError::Repo(RepoError::Timeout))
            }
        }
    }
}
