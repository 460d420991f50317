//! Blob Store Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{BlobMetadata, BlobStore},
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Tokio-based blob store
///
/// Stores payloads as plain files under an app-scoped data directory using
/// `tokio::fs` for async I/O.
pub struct TokioBlobStore {
    data_dir: PathBuf,
}

impl TokioBlobStore {
    /// Create a blob store rooted at the platform data directory.
    pub fn new() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("magazine-reader-core");

        Self { data_dir }
    }

    /// Create a blob store rooted at a custom directory.
    pub fn with_root(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }
}

impl Default for TokioBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for TokioBlobStore {
    async fn base_directory(&self) -> Result<PathBuf> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)
                .await
                .map_err(Self::map_io_error)?;
            debug!(path = ?self.data_dir, "Created data directory");
        }
        Ok(self.data_dir.clone())
    }

    async fn ensure_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Ensured directory");
        Ok(())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::try_exists(path).await.map_err(Self::map_io_error)?)
    }

    async fn metadata(&self, path: &Path) -> Result<BlobMetadata> {
        let metadata = fs::metadata(path).await.map_err(Self::map_io_error)?;

        Ok(BlobMetadata {
            size: metadata.len(),
            modified_at: metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64),
        })
    }

    async fn write_whole(&self, path: &Path, data: Bytes) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(Self::map_io_error)?;
        }

        fs::write(path, data.as_ref())
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Wrote blob");
        Ok(())
    }

    async fn read_whole(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Read blob");
        Ok(Bytes::from(data))
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn base_directory_is_created() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");
        let store = TokioBlobStore::with_root(root.clone());

        let base = store.base_directory().await.unwrap();
        assert_eq!(base, root);
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn write_read_delete_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = TokioBlobStore::with_root(tmp.path().to_path_buf());
        let path = tmp.path().join("offline_content").join("m1.cache");

        store
            .write_whole(&path, Bytes::from_static(b"issue text"))
            .await
            .unwrap();
        assert!(store.exists(&path).await.unwrap());
        assert_eq!(store.metadata(&path).await.unwrap().size, 10);

        let data = store.read_whole(&path).await.unwrap();
        assert_eq!(data, Bytes::from_static(b"issue text"));

        store.delete(&path).await.unwrap();
        assert!(!store.exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn ensure_directory_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = TokioBlobStore::with_root(tmp.path().to_path_buf());
        let dir = tmp.path().join("offline_content");

        store.ensure_directory(&dir).await.unwrap();
        store.ensure_directory(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn delete_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = TokioBlobStore::with_root(tmp.path().to_path_buf());

        let result = store.delete(&tmp.path().join("absent.cache")).await;
        assert!(result.is_err());
    }
}
