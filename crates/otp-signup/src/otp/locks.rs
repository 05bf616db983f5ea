//! Per-phone-number mutual exclusion.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type KeyMutex = Arc<Mutex<()>>;

/// A map of async locks keyed by string.
///
/// Locks are created on first use and dropped from the map once no task
/// holds or waits on them, so the map only holds keys with activity.
#[derive(Default)]
pub struct KeyedLocks {
    locks: DashMap<String, KeyMutex>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting for any current holder.
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_default()
            .value()
            .clone();

        let guard = mutex.clone().lock_owned().await;

        KeyGuard {
            owner: self,
            key: key.to_string(),
            mutex,
            guard: Some(guard),
        }
    }

    /// Number of keys with a live lock.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held lock for one key. Released on drop.
pub struct KeyGuard<'a> {
    owner: &'a KeyedLocks,
    key: String,
    mutex: KeyMutex,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        // One reference in the map, one here: nobody else is waiting.
        self.owner
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 2);
    }
}
