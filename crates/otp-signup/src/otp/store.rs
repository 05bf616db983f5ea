//! Pending verification storage.

use super::PendingVerification;
use crate::error::SignupError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Key-value store for pending verifications, keyed by phone number.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// Insert or replace the pending verification for its phone number.
    async fn put(&self, pending: PendingVerification) -> Result<(), SignupError>;

    /// Get the pending verification for a phone number, expired or not.
    async fn get(&self, phone_number: &str) -> Result<Option<PendingVerification>, SignupError>;

    /// Remove the pending verification for a phone number.
    async fn remove(&self, phone_number: &str) -> Result<bool, SignupError>;

    /// Remove every entry expired at `now`, returning how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, SignupError>;

    /// Number of entries currently held.
    async fn len(&self) -> usize;
}

/// In-process pending store with a bound on the number of entries.
pub struct MemoryPendingStore {
    entries: RwLock<HashMap<String, PendingVerification>>,
    max_entries: usize,
}

impl MemoryPendingStore {
    /// Create a store holding at most `max_entries` pending verifications.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Maximum number of entries.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

#[async_trait]
impl PendingStore for MemoryPendingStore {
    async fn put(&self, pending: PendingVerification) -> Result<(), SignupError> {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&pending.phone_number) && entries.len() >= self.max_entries {
            let now = Utc::now();
            entries.retain(|_, entry| !entry.is_expired_at(now));

            if entries.len() >= self.max_entries {
                let oldest = entries
                    .values()
                    .min_by_key(|entry| entry.expires_at)
                    .map(|entry| entry.phone_number.clone());

                if let Some(phone_number) = oldest {
                    warn!(
                        phone_number = %phone_number,
                        max_entries = self.max_entries,
                        "Pending store full, evicting oldest entry"
                    );
                    entries.remove(&phone_number);
                }
            }
        }

        entries.insert(pending.phone_number.clone(), pending);
        Ok(())
    }

    async fn get(&self, phone_number: &str) -> Result<Option<PendingVerification>, SignupError> {
        Ok(self.entries.read().await.get(phone_number).cloned())
    }

    async fn remove(&self, phone_number: &str) -> Result<bool, SignupError> {
        Ok(self.entries.write().await.remove(phone_number).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, SignupError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!("Purged {} expired pending verifications", removed);
        }

        Ok(removed)
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
