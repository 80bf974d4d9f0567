//! Read-through snapshot cache.
//!
//! - [`CacheStore`]: raw key/value backends ([`MemoryCache`], [`RedisCache`], [`NoopCache`])
//! - [`SnapshotCache`]: typed JSON snapshots with the miss-on-failure policy
//! - [`CacheKey`]: item and parent-scoped list keys

mod config;
mod keys;
mod lock;
mod redis_store;
mod snapshot;
mod store;

pub use config::CacheConfig;
pub use keys::CacheKey;
pub use redis_store::RedisCache;
pub use snapshot::SnapshotCache;
pub use store::{CacheError, CacheStore, MemoryCache, NoopCache};
