//! Background purge of expired pending verifications.

use super::PendingStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Run one purge pass, returning how many entries were removed.
pub async fn sweep_once(store: &dyn PendingStore) -> usize {
    match store.purge_expired(Utc::now()).await {
        Ok(removed) => {
            if removed > 0 {
                debug!("Swept {} expired pending verifications", removed);
            }
            removed
        }
        Err(e) => {
            error!("Pending verification sweep failed: {}", e);
            0
        }
    }
}

/// Spawn the sweeper as a background task.
///
/// Returns `None` when `interval` is zero (sweeper disabled).
pub fn spawn_sweeper(
    store: Arc<dyn PendingStore>,
    interval: Duration,
) -> Option<tokio::task::JoinHandle<()>> {
    if interval.is_zero() {
        info!("Pending verification sweeper disabled");
        return None;
    }

    info!("Starting pending verification sweeper, interval: {:?}", interval);

    Some(tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            sweep_once(store.as_ref()).await;
        }
    }))
}
