//! In-memory picture storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StorageError, StorageProvider};
use crate::picture::PictureUpload;

#[derive(Debug, Default)]
struct InMemoryStorageState {
    objects: HashMap<String, Vec<u8>>,
    next_id: u32,
    uploads: u32,
    deletes: u32,
    fail_on_upload: bool,
    fail_on_delete: bool,
}

/// Storage provider that keeps pictures in memory.
///
/// Locators look like `memory://pets/IMG-0001.png`. Failures can be switched
/// on to exercise rollback paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorageProvider {
    state: Arc<RwLock<InMemoryStorageState>>,
}

impl InMemoryStorageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures subsequent uploads to fail.
    pub async fn set_fail_on_upload(&self, fail: bool) {
        self.state.write().await.fail_on_upload = fail;
    }

    /// Configures subsequent deletes to fail.
    pub async fn set_fail_on_delete(&self, fail: bool) {
        self.state.write().await.fail_on_delete = fail;
    }

    /// Number of pictures currently stored.
    pub async fn object_count(&self) -> usize {
        self.state.read().await.objects.len()
    }

    /// Returns true if a picture is stored under the locator.
    pub async fn contains(&self, locator: &str) -> bool {
        self.state.read().await.objects.contains_key(locator)
    }

    /// Number of successful uploads so far.
    pub async fn upload_count(&self) -> u32 {
        self.state.read().await.uploads
    }

    /// Number of successful delete calls so far.
    pub async fn delete_count(&self) -> u32 {
        self.state.read().await.deletes
    }
}

#[async_trait]
impl StorageProvider for InMemoryStorageProvider {
    async fn upload(&self, picture: &PictureUpload) -> Result<String, StorageError> {
        let mut state = self.state.write().await;

        if state.fail_on_upload {
            return Err(StorageError::Rejected("upload refused".to_string()));
        }

        state.next_id += 1;
        let locator = format!("memory://pets/IMG-{:04}.{}", state.next_id, picture.extension());
        state.objects.insert(locator.clone(), picture.bytes.clone());
        state.uploads += 1;

        Ok(locator)
    }

    async fn delete(&self, locator: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().await;

        if state.fail_on_delete {
            return Err(StorageError::Rejected("delete refused".to_string()));
        }
        if !locator.starts_with("memory://pets/") {
            return Err(StorageError::InvalidLocator(locator.to_string()));
        }

        state.objects.remove(locator);
        state.deletes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture() -> PictureUpload {
        PictureUpload::new("rex.png", "image/png", vec![1, 2, 3])
    }

    #[tokio::test]
    async fn test_upload_and_delete() {
        let storage = InMemoryStorageProvider::new();

        let locator = storage.upload(&picture()).await.unwrap();
        assert_eq!(locator, "memory://pets/IMG-0001.png");
        assert!(storage.contains(&locator).await);

        storage.delete(&locator).await.unwrap();
        assert_eq!(storage.object_count().await, 0);
        assert_eq!(storage.delete_count().await, 1);
    }

    #[tokio::test]
    async fn test_locators_are_sequential() {
        let storage = InMemoryStorageProvider::new();
        let first = storage.upload(&picture()).await.unwrap();
        let second = storage.upload(&picture()).await.unwrap();
        assert_eq!(first, "memory://pets/IMG-0001.png");
        assert_eq!(second, "memory://pets/IMG-0002.png");
        assert_eq!(storage.upload_count().await, 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let storage = InMemoryStorageProvider::new();
        storage.delete("memory://pets/IMG-0042.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_foreign_locator_fails() {
        let storage = InMemoryStorageProvider::new();
        let result = storage.delete("/uploads/pets/x.png").await;
        assert!(matches!(result, Err(StorageError::InvalidLocator(_))));
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let storage = InMemoryStorageProvider::new();

        storage.set_fail_on_upload(true).await;
        assert!(storage.upload(&picture()).await.is_err());
        assert_eq!(storage.object_count().await, 0);

        storage.set_fail_on_upload(false).await;
        let locator = storage.upload(&picture()).await.unwrap();

        storage.set_fail_on_delete(true).await;
        assert!(storage.delete(&locator).await.is_err());
        assert!(storage.contains(&locator).await);
    }
}
