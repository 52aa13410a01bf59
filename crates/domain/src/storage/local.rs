//! Filesystem picture storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use super::{StorageError, StorageProvider};
use crate::picture::PictureUpload;

/// Stores pictures as files in a directory served under a public URL prefix.
///
/// A picture written to `<root>/pet_<uuid>.png` gets the locator
/// `<url_prefix>/pet_<uuid>.png`.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    root: PathBuf,
    url_prefix: String,
}

impl LocalStorageProvider {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into();
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Maps a locator back to the file it names.
    fn path_for(&self, locator: &str) -> Result<PathBuf, StorageError> {
        let file_name = locator
            .strip_prefix(&self.url_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| is_plain_file_name(name))
            .ok_or_else(|| StorageError::InvalidLocator(locator.to_string()))?;
        Ok(self.root.join(file_name))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    async fn upload(&self, picture: &PictureUpload) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let file_name = format!("pet_{}.{}", Uuid::new_v4(), picture.extension());
        tokio::fs::write(self.root.join(&file_name), &picture.bytes).await?;

        tracing::debug!(file = %file_name, bytes = picture.len(), "picture stored");
        Ok(format!("{}/{}", self.url_prefix, file_name))
    }

    async fn delete(&self, locator: &str) -> Result<(), StorageError> {
        if locator.is_empty() {
            return Ok(());
        }

        let path = self.path_for(locator)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
