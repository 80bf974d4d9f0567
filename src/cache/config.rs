//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 3600;
const DEFAULT_OP_TIMEOUT_MS: u64 = 250;
const DEFAULT_MEMORY_MAX_ENTRIES: usize = 10_000;

/// Parameters shared by every snapshot read and write.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Lifetime of every cached snapshot.
    pub ttl: Duration,
    /// Namespace prepended to every rendered key.
    pub key_prefix: String,
    /// Upper bound for a single backend call; slower calls count as a miss.
    pub op_timeout: Duration,
    /// Maximum entries held by the in-process backend before LRU eviction.
    pub memory_max_entries: usize,
}

impl CacheConfig {
    /// Returns the in-process capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_max_entries_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_max_entries).unwrap_or(NonZeroUsize::MIN)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            key_prefix: String::new(),
            op_timeout: Duration::from_millis(DEFAULT_OP_TIMEOUT_MS),
            memory_max_entries: DEFAULT_MEMORY_MAX_ENTRIES,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            ttl: settings.ttl,
            key_prefix: settings.key_prefix.clone(),
            op_timeout: settings.op_timeout,
            memory_max_entries: settings.memory_max_entries.get(),
        }
    }
}
