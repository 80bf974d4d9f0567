//! Key-value cache backends.
//!
//! Backends move opaque JSON text; typing and failure policy live in
//! [`SnapshotCache`](super::SnapshotCache).

use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use thiserror::Error;
use tokio::time::Instant;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out")]
    Timeout,
    #[error("cache payload could not be decoded: {0}")]
    Codec(String),
}

impl CacheError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

const SOURCE: &str = "menu_catalog::cache::store::MemoryCache";

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-process backend with per-entry expiry and LRU eviction.
///
/// The entry bound holds regardless of TTL: once full, every `set` of a new
/// key evicts the least recently used entry, expired or not.
pub struct MemoryCache {
    entries: RwLock<LruCache<String, MemoryEntry>>,
}

impl MemoryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_capacity(config.memory_max_entries_non_zero())
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Number of unexpired entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        rw_read(&self.entries, SOURCE, "len")
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> NonZeroUsize {
        rw_read(&self.entries, SOURCE, "capacity").cap()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let entry = MemoryEntry {
            value,
            expires_at: now + ttl,
        };
        let mut entries = rw_write(&self.entries, SOURCE, "set");
        while entries
            .peek_lru()
            .is_some_and(|(_, oldest)| !oldest.is_live(now))
        {
            entries.pop_lru();
        }
        entries.put(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        rw_write(&self.entries, SOURCE, "delete").pop(key);
        Ok(())
    }
}

/// Always-miss backend used when no cache server is reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn memory_entries_expire_after_ttl() {
        let cache = MemoryCache::default();
        cache
            .set("menus_list", "[]".into(), Duration::from_secs(10))
            .await
            .expect("set");

        assert_eq!(cache.get("menus_list").await.expect("get").as_deref(), Some("[]"));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.get("menus_list").await.expect("get"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn memory_delete_is_idempotent() {
        let cache = MemoryCache::default();
        cache.delete("missing").await.expect("delete absent key");
        cache
            .set("k", "1".into(), Duration::from_secs(60))
            .await
            .expect("set");
        cache.delete("k").await.expect("delete");
        cache.delete("k").await.expect("delete again");
        assert_eq!(cache.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn noop_cache_always_misses() {
        let cache = NoopCache;
        cache
            .set("k", "1".into(), Duration::from_secs(60))
            .await
            .expect("set");
        assert_eq!(cache.get("k").await.expect("get"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn memory_cache_stays_within_capacity_when_only_written() {
        let cache = MemoryCache::with_capacity(NonZeroUsize::new(100).expect("non-zero"));
        for index in 0..10_000 {
            cache
                .set(&format!("dish-{index}"), "{}".into(), Duration::from_secs(1))
                .await
                .expect("set");
        }
        assert_eq!(cache.len(), 100);

        tokio::time::advance(Duration::from_secs(5)).await;
        cache
            .set("menus_list", "[]".into(), Duration::from_secs(1))
            .await
            .expect("set");

        let stored = rw_read(&cache.entries, SOURCE, "test").len();
        assert_eq!(stored, 1, "expired entries are dropped on write");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn memory_cache_evicts_least_recently_used() {
        let cache = MemoryCache::with_capacity(NonZeroUsize::new(2).expect("non-zero"));
        let ttl = Duration::from_secs(60);
        cache.set("a", "1".into(), ttl).await.expect("set a");
        cache.set("b", "2".into(), ttl).await.expect("set b");
        assert_eq!(cache.get("a").await.expect("get a").as_deref(), Some("1"));

        cache.set("c", "3".into(), ttl).await.expect("set c");

        assert_eq!(cache.get("b").await.expect("get b"), None);
        assert_eq!(cache.get("a").await.expect("get a").as_deref(), Some("1"));
        assert_eq!(cache.get("c").await.expect("get c").as_deref(), Some("3"));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let config = CacheConfig {
            memory_max_entries: 0,
            ..CacheConfig::default()
        };
        assert_eq!(MemoryCache::new(&config).capacity().get(), 1);
    }
}
