use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

/// Acquire a read guard, taking over the data of a poisoned lock.
pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    source: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!(
            target = "menu_catalog::cache::lock",
            source,
            op,
            mode = "read",
            "cache lock poisoned by a panicked writer; continuing with its data"
        );
        poisoned.into_inner()
    })
}

/// Acquire a write guard, taking over the data of a poisoned lock.
pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    source: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!(
            target = "menu_catalog::cache::lock",
            source,
            op,
            mode = "write",
            "cache lock poisoned by a panicked writer; continuing with its data"
        );
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn poisoned_lock_keeps_serving_its_data() {
        let lock = Arc::new(RwLock::new(vec![1_u32]));
        let shared = Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let mut guard = shared.write().expect("fresh lock");
            guard.push(2);
            panic!("writer dies holding the lock");
        })
        .join();

        assert!(lock.is_poisoned());
        rw_write(&lock, "menu_catalog::cache::lock::tests", "push").push(3);
        assert_eq!(*rw_read(&lock, "menu_catalog::cache::lock::tests", "read"), vec![1, 2, 3]);
    }
}
