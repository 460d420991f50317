//! Key-Value Storage using Plain Files
//!
//! One file per key under an app-scoped preferences directory. The offline
//! core only stores a couple of JSON documents here, so a database would be
//! more machinery than the contract needs.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::KeyValueStore,
};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// File-backed key-value store implementation
///
/// Each key maps to `<prefs_dir>/<sanitized-key>.json`. Writes go through a
/// temporary file and rename so a crash mid-write never leaves a truncated
/// value behind.
pub struct FileKeyValueStore {
    prefs_dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store under the platform config directory.
    pub fn new() -> Self {
        let prefs_dir = dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("magazine-reader-core");

        Self { prefs_dir }
    }

    /// Create a store under a custom directory.
    pub fn with_directory(prefs_dir: PathBuf) -> Self {
        Self { prefs_dir }
    }

    /// Map a key to its backing file, replacing characters that are not
    /// filesystem-safe.
    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.prefs_dir.join(format!("{safe}.json"))
    }

    async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.prefs_dir)
            .await
            .map_err(BridgeError::Io)
    }
}

impl Default for FileKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(value) => {
                debug!(key = key, "Retrieved value");
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir().await?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, value).await.map_err(BridgeError::Io)?;
        fs::rename(&tmp, &path).await.map_err(BridgeError::Io)?;

        debug!(key = key, size = value.len(), "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                debug!(key = key, "Removed value");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }
}
