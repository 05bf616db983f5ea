//! Device registration records and their storage.

mod file;

pub use file::FileDeviceStore;

use crate::config::{DevicesBackend, DevicesConfig};
use crate::error::SignupError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// A device registered for notifications after phone verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    /// The verified phone number in E.164 format
    pub phone_number: String,

    /// Client-supplied device identifier
    pub device_id: String,

    /// When the registration was created
    pub created_at: DateTime<Utc>,
}

impl DeviceRegistration {
    /// Create a registration timestamped now.
    pub fn new(phone_number: String, device_id: String) -> Self {
        Self {
            phone_number,
            device_id,
            created_at: Utc::now(),
        }
    }
}

/// Persistence for device registrations, keyed by phone number.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Store a registration, replacing any earlier one for the same number.
    async fn put(&self, registration: &DeviceRegistration) -> Result<(), SignupError>;

    /// Look up the registration for a phone number.
    async fn get(&self, phone_number: &str) -> Result<Option<DeviceRegistration>, SignupError>;

    /// Number of stored registrations.
    async fn count(&self) -> usize;
}

/// Device store kept in process memory.
#[derive(Default)]
pub struct MemoryDeviceStore {
    registrations: RwLock<HashMap<String, DeviceRegistration>>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn put(&self, registration: &DeviceRegistration) -> Result<(), SignupError> {
        self.registrations
            .write()
            .await
            .insert(registration.phone_number.clone(), registration.clone());
        Ok(())
    }

    async fn get(&self, phone_number: &str) -> Result<Option<DeviceRegistration>, SignupError> {
        Ok(self.registrations.read().await.get(phone_number).cloned())
    }

    async fn count(&self) -> usize {
        self.registrations.read().await.len()
    }
}

/// Build the device store selected by configuration.
pub async fn build_device_store(
    config: &DevicesConfig,
) -> Result<Arc<dyn DeviceStore>, SignupError> {
    match config.backend {
        DevicesBackend::Memory => {
            info!("Using in-memory device store");
            Ok(Arc::new(MemoryDeviceStore::new()))
        }
        DevicesBackend::File => {
            let store = FileDeviceStore::open(config.path.clone()).await?;
            Ok(Arc::new(store))
        }
    }
}
