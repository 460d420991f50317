//! In-Memory Mock Implementations
//!
//! Fakes for every bridge trait, with failure injection, so core crates can
//! exercise their storage and notification paths without a real platform.
//! These are shipped (not `#[cfg(test)]`) so downstream crates can use them
//! in their own test suites.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{BridgeError, Result};
use crate::notify::{NotificationChannel, NotificationKind};
use crate::storage::{BlobMetadata, BlobStore, KeyValueStore};

/// In-memory [`BlobStore`] backed by a path-keyed map.
///
/// Supports one-shot write failure and persistent delete failure injection
/// for exercising abort and retain paths.
#[derive(Default)]
pub struct MemoryBlobStore {
    files: Mutex<HashMap<PathBuf, Bytes>>,
    directories: Mutex<HashSet<PathBuf>>,
    fail_next_write: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `write_whole` call fail with an I/O-style error.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Make every `delete` call fail until cleared.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Drop a stored file without going through `delete`, simulating
    /// out-of-band removal by the operating system.
    pub fn remove_out_of_band(&self, path: &Path) -> bool {
        self.files.lock().remove(path).is_some()
    }

    /// Number of files currently stored.
    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }

    /// Whether a file is currently stored at `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }

    /// Paths of all stored files, in no particular order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn base_directory(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/mock"))
    }

    async fn ensure_directory(&self, path: &Path) -> Result<()> {
        self.directories.lock().insert(path.to_path_buf());
        Ok(())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.lock().contains_key(path))
    }

    async fn metadata(&self, path: &Path) -> Result<BlobMetadata> {
        let files = self.files.lock();
        let data = files.get(path).ok_or_else(|| {
            BridgeError::OperationFailed(format!("no such file: {}", path.display()))
        })?;

        Ok(BlobMetadata {
            size: data.len() as u64,
            modified_at: None,
        })
    }

    async fn write_whole(&self, path: &Path, data: Bytes) -> Result<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(format!(
                "injected write failure: {}",
                path.display()
            )));
        }

        self.files.lock().insert(path.to_path_buf(), data);
        Ok(())
    }

    async fn read_whole(&self, path: &Path) -> Result<Bytes> {
        self.files.lock().get(path).cloned().ok_or_else(|| {
            BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            ))
        })
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(format!(
                "injected delete failure: {}",
                path.display()
            )));
        }

        self.files.lock().remove(path);
        Ok(())
    }
}

/// In-memory [`KeyValueStore`] with set-failure injection.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
    fail_sets: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `set` call fail until cleared.
    pub fn set_fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    /// Seed a value directly, bypassing failure injection.
    pub fn seed(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    /// Read a value directly, for asserting on persisted state.
    pub fn raw_value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed(format!(
                "injected set failure: {key}"
            )));
        }

        self.values
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// [`NotificationChannel`] that records every message for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, NotificationKind)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far, in delivery order.
    pub fn messages(&self) -> Vec<(String, NotificationKind)> {
        self.messages.lock().clone()
    }

    /// Number of notifications received.
    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }

    /// Kind of the most recent notification, if any.
    pub fn last_kind(&self) -> Option<NotificationKind> {
        self.messages.lock().last().map(|(_, kind)| *kind)
    }
}

#[async_trait]
impl NotificationChannel for RecordingNotifier {
    async fn notify(&self, message: &str, kind: NotificationKind) {
        self.messages.lock().push((message.to_string(), kind));
    }
}
