//! Picture storage providers.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::picture::PictureUpload;

pub use local::LocalStorageProvider;
pub use memory::InMemoryStorageProvider;

/// Errors that can occur in a storage provider.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The locator was not issued by this provider.
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// The provider refused the operation.
    #[error("Storage rejected the request: {0}")]
    Rejected(String),
}

/// Remote storage for pet pictures.
///
/// A locator is an opaque string returned by [`upload`](Self::upload) and
/// accepted by [`delete`](Self::delete). Implementations must be safe to
/// share across concurrent requests.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Stores the picture and returns its locator.
    async fn upload(&self, picture: &PictureUpload) -> Result<String, StorageError>;

    /// Removes a stored picture. Deleting something already gone succeeds.
    async fn delete(&self, locator: &str) -> Result<(), StorageError>;
}
