//! JSON file persistence for device registrations.

use super::{DeviceRegistration, DeviceStore};
use crate::error::SignupError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Device store persisted to a JSON file.
///
/// The whole set is rewritten on every put using a temp file and rename, so
/// the file is never observed half-written. The in-memory copy only changes
/// once the write succeeded.
pub struct FileDeviceStore {
    path: PathBuf,
    registrations: RwLock<HashMap<String, DeviceRegistration>>,
}

impl FileDeviceStore {
    /// Open the store, loading existing registrations if the file exists.
    pub async fn open(path: PathBuf) -> Result<Self, SignupError> {
        let registrations = load(&path).await?;

        info!(
            "Loaded {} device registrations from {:?}",
            registrations.len(),
            path
        );

        Ok(Self {
            path,
            registrations: RwLock::new(registrations),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn save(&self, registrations: &HashMap<String, DeviceRegistration>) -> Result<(), SignupError> {
        let mut records: Vec<&DeviceRegistration> = registrations.values().collect();
        records.sort_by(|a, b| a.phone_number.cmp(&b.phone_number));

        let data = serde_json::to_vec_pretty(&records)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file + rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!("Saved {} device registrations to {:?}", records.len(), self.path);
        Ok(())
    }
}

async fn load(path: &Path) -> Result<HashMap<String, DeviceRegistration>, SignupError> {
    if !path.exists() {
        info!("Device file not found at {:?}, starting empty", path);
        return Ok(HashMap::new());
    }

    let data = fs::read(path).await?;
    if data.is_empty() {
        return Ok(HashMap::new());
    }

    let records: Vec<DeviceRegistration> = serde_json::from_slice(&data)?;
    Ok(records
        .into_iter()
        .map(|r| (r.phone_number.clone(), r))
        .collect())
}

#[async_trait]
impl DeviceStore for FileDeviceStore {
    async fn put(&self, registration: &DeviceRegistration) -> Result<(), SignupError> {
        let mut registrations = self.registrations.write().await;

        let mut updated = registrations.clone();
        updated.insert(registration.phone_number.clone(), registration.clone());

        self.save(&updated).await?;
        *registrations = updated;
        Ok(())
    }

    async fn get(&self, phone_number: &str) -> Result<Option<DeviceRegistration>, SignupError> {
        Ok(self.registrations.read().await.get(phone_number).cloned())
    }

    async fn count(&self) -> usize {
        self.registrations.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileDeviceStore::open(dir.path().join("devices.json"))
            .await
            .unwrap();
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_put_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("devices.json");

        let store = FileDeviceStore::open(path.clone()).await.unwrap();
        let registration = DeviceRegistration::new("+14155551234".into(), "web-1".into());
        store.put(&registration).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let reopened = FileDeviceStore::open(path).await.unwrap();
        assert_eq!(reopened.count().await, 1);
        assert_eq!(
            reopened.get("+14155551234").await.unwrap(),
            Some(registration)
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        std::fs::write(&path, b"not json").unwrap();

        let result = FileDeviceStore::open(path).await;
        assert!(matches!(result, Err(SignupError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_unchanged() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("devices.json");
        let store = FileDeviceStore::open(path.clone()).await.unwrap();
        std::fs::create_dir_all(path.join("blocker")).unwrap();

        let registration = DeviceRegistration::new("+14155551234".into(), "web-1".into());
        assert!(store.put(&registration).await.is_err());
        assert_eq!(store.count().await, 0);
    }
}
