//! Offline library configuration

/// Configuration for the offline content library.
#[derive(Debug, Clone)]
pub struct OfflineConfig {
    /// Directory for downloaded payloads, relative to the blob store's base
    /// directory (default: "offline_content")
    pub download_directory: String,

    /// Chunk size for the download progress loop in bytes (default: 64 KiB)
    pub chunk_size_bytes: usize,

    /// Key the serialized cache index is persisted under
    pub index_key: String,

    /// Key the serialized favorites list is persisted under
    pub favorites_key: String,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            download_directory: "offline_content".to_string(),
            chunk_size_bytes: 64 * 1024,
            index_key: "offline.cache_index".to_string(),
            favorites_key: "offline.favorites".to_string(),
        }
    }
}

impl OfflineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the download directory name.
    pub fn with_download_directory(mut self, dir: String) -> Self {
        self.download_directory = dir;
        self
    }

    /// Set the progress chunk size.
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size_bytes = bytes;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.download_directory.is_empty() {
            return Err("download_directory cannot be empty".to_string());
        }

        if self.chunk_size_bytes == 0 {
            return Err("chunk_size_bytes must be greater than 0".to_string());
        }

        if self.index_key.is_empty() || self.favorites_key.is_empty() {
            return Err("persistence keys cannot be empty".to_string());
        }

        if self.index_key == self.favorites_key {
            return Err("index_key and favorites_key must differ".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OfflineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.download_directory, "offline_content");
        assert_eq!(config.chunk_size_bytes, 64 * 1024);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = OfflineConfig::new()
            .with_download_directory("issues".to_string())
            .with_chunk_size(1024);

        assert_eq!(config.download_directory, "issues");
        assert_eq!(config.chunk_size_bytes, 1024);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let empty_dir = OfflineConfig::new().with_download_directory(String::new());
        assert!(empty_dir.validate().is_err());

        let zero_chunk = OfflineConfig::new().with_chunk_size(0);
        assert!(zero_chunk.validate().is_err());

        let mut clashing_keys = OfflineConfig::new();
        clashing_keys.favorites_key = clashing_keys.index_key.clone();
        assert!(clashing_keys.validate().is_err());
    }
}
