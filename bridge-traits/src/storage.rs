//! Storage Abstractions
//!
//! Platform-agnostic traits for durable payload storage and key-value
//! preferences storage.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Metadata for a stored blob.
#[derive(Debug, Clone)]
pub struct BlobMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
}

/// Durable blob storage trait
///
/// Abstracts whole-file payload storage scoped to the application's private
/// storage area:
/// - Desktop: direct filesystem access under the app data directory
/// - iOS/Android: sandboxed app directories
///
/// Paths handed to this trait are opaque handles produced by the core; the
/// implementation owns where they actually live.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::BlobStore;
///
/// async fn store_payload(blobs: &dyn BlobStore, data: bytes::Bytes) -> Result<()> {
///     let dir = blobs.base_directory().await?.join("offline_content");
///     blobs.ensure_directory(&dir).await?;
///     blobs.write_whole(&dir.join("issue-42.cache"), data).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Get the root directory for app-scoped blob storage.
    async fn base_directory(&self) -> Result<PathBuf>;

    /// Create a directory and all parents if they don't exist.
    ///
    /// Must be idempotent: creating an existing directory is not an error.
    async fn ensure_directory(&self, path: &Path) -> Result<()>;

    /// Check whether a file exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a stored blob.
    async fn metadata(&self, path: &Path) -> Result<BlobMetadata>;

    /// Write a complete payload to a file, replacing any previous content.
    async fn write_whole(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Read a complete payload into memory.
    async fn read_whole(&self, path: &Path) -> Result<Bytes>;

    /// Delete a file.
    async fn delete(&self, path: &Path) -> Result<()>;
}

/// Persistent key-value storage trait
///
/// Abstracts platform preferences storage:
/// - iOS: UserDefaults
/// - Android: SharedPreferences / DataStore
/// - Desktop: config files or OS-specific preferences
///
/// Values are opaque strings; callers that need structure serialize to JSON
/// before storing.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value. Returns `Ok(None)` if the key has never been set.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Check whether a key is present without reading its value.
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_metadata_fields() {
        let metadata = BlobMetadata {
            size: 1024,
            modified_at: Some(1234567890),
        };

        assert_eq!(metadata.size, 1024);
        assert_eq!(metadata.modified_at, Some(1234567890));
    }
}
