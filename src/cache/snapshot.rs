//! Typed, best-effort access to the cache backend.
//!
//! Every failure (backend error, timeout, undecodable payload) is logged,
//! counted and reported to the caller as a plain miss. Failed invalidations
//! are logged and dropped; the TTL bounds how long a stale entry can live.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::store::{CacheError, CacheStore};

const TARGET: &str = "menu_catalog::cache";

#[derive(Clone)]
pub struct SnapshotCache {
    store: Arc<dyn CacheStore>,
    config: CacheConfig,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self { store, config }
    }

    pub async fn fetch<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let rendered = key.render(&self.config.key_prefix);
        let kind = key.kind().as_str();

        let raw = match self.bounded(self.store.get(&rendered)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                counter!("catalog_cache_miss_total", "kind" => kind).increment(1);
                return None;
            }
            Err(err) => {
                counter!("catalog_cache_error_total", "kind" => kind).increment(1);
                warn!(
                    target = TARGET,
                    key = %rendered,
                    op = "get",
                    error = %err,
                    "cache read failed, falling back to store"
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                counter!("catalog_cache_hit_total", "kind" => kind).increment(1);
                debug!(target = TARGET, key = %rendered, "cache hit");
                Some(value)
            }
            Err(err) => {
                counter!("catalog_cache_error_total", "kind" => kind).increment(1);
                warn!(
                    target = TARGET,
                    key = %rendered,
                    op = "decode",
                    error = %CacheError::Codec(err.to_string()),
                    "discarding undecodable cache entry"
                );
                self.delete_rendered(&rendered, kind).await;
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let rendered = key.render(&self.config.key_prefix);
        let kind = key.kind().as_str();

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(
                    target = TARGET,
                    key = %rendered,
                    op = "encode",
                    error = %err,
                    "cache payload could not be encoded"
                );
                return;
            }
        };

        if let Err(err) = self
            .bounded(self.store.set(&rendered, payload, self.config.ttl))
            .await
        {
            counter!("catalog_cache_error_total", "kind" => kind).increment(1);
            warn!(
                target = TARGET,
                key = %rendered,
                op = "set",
                error = %err,
                "cache write failed"
            );
        }
    }

    /// Drop every listed entry; duplicates are removed once.
    pub async fn invalidate(&self, keys: &[CacheKey]) {
        let mut seen = HashSet::new();
        let targets: Vec<(String, &'static str)> = keys
            .iter()
            .filter(|key| seen.insert(**key))
            .map(|key| (key.render(&self.config.key_prefix), key.kind().as_str()))
            .collect();

        join_all(
            targets
                .iter()
                .map(|(rendered, kind)| self.delete_rendered(rendered, *kind)),
        )
        .await;
    }

    async fn delete_rendered(&self, rendered: &str, kind: &'static str) {
        counter!("catalog_cache_invalidate_total", "kind" => kind).increment(1);
        if let Err(err) = self.bounded(self.store.delete(rendered)).await {
            counter!("catalog_cache_error_total", "kind" => kind).increment(1);
            warn!(
                target = TARGET,
                key = %rendered,
                op = "delete",
                error = %err,
                "cache invalidation failed"
            );
        }
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.config.op_timeout, operation)
            .await
            .unwrap_or(Err(CacheError::Timeout))
    }
}
