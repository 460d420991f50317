//! Download orchestrator
//!
//! Acquires a content payload for one catalog item exactly once, with
//! observable progress, and hands the finished entry to the cache index.
//! Where the bytes come from is a pluggable [`PayloadSource`] strategy, so
//! the chunking, progress, and commit logic stays independent of transport.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use bridge_traits::error::BridgeError;
use bridge_traits::storage::BlobStore;

use crate::config::OfflineConfig;
use crate::error::{OfflineError, Result};
use crate::index::CacheIndex;
use crate::models::{CachedItem, Magazine};
use crate::progress::{DownloadProgressEvent, ProgressCallback};

/// Strategy producing the payload bytes for a catalog item.
#[async_trait]
pub trait PayloadSource: Send + Sync {
    async fn payload(&self, magazine: &Magazine) -> Result<Bytes>;
}

/// Payload source that fabricates placeholder issue content.
///
/// Stands in until the real asset endpoint is wired up; the orchestrator
/// neither knows nor cares.
#[derive(Debug, Default, Clone, Copy)]
pub struct SynthesizedPayloadSource;

impl SynthesizedPayloadSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PayloadSource for SynthesizedPayloadSource {
    async fn payload(&self, magazine: &Magazine) -> Result<Bytes> {
        let mut body = format!(
            "{} ({})\n{}\n\n",
            magazine.title, magazine.category, magazine.description
        );
        for page in 1..=24 {
            body.push_str(&format!(
                "Page {page}: placeholder copy for \"{}\".\n",
                magazine.title
            ));
        }
        Ok(Bytes::from(body))
    }
}

/// Outcome of a removal request.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// The blob was deleted and the index entry dropped.
    Removed(CachedItem),
    /// Nothing was cached under that id. Removal is idempotent, so this is
    /// an outcome, not an error.
    NotFound,
}

/// Drives acquisition and removal of offline payloads.
///
/// At most one acquisition per content id is in flight at a time; a second
/// call for the same id fails fast instead of racing the first.
pub struct DownloadOrchestrator {
    config: OfflineConfig,
    blobs: Arc<dyn BlobStore>,
    index: Arc<CacheIndex>,
    source: Arc<dyn PayloadSource>,
    in_flight: Mutex<HashSet<String>>,
}

impl DownloadOrchestrator {
    pub fn new(
        config: OfflineConfig,
        blobs: Arc<dyn BlobStore>,
        index: Arc<CacheIndex>,
        source: Arc<dyn PayloadSource>,
    ) -> Self {
        Self {
            config,
            blobs,
            index,
            source,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Download one catalog item into the offline cache.
    ///
    /// Emits `in_progress` events with monotonically non-decreasing percent
    /// after each chunk, commits the payload with a single whole-file write,
    /// then inserts the entry into the index and emits `completed`. On any
    /// failure nothing is committed: partial blobs are discarded, a `failed`
    /// event is emitted, and the error is returned.
    pub async fn acquire(
        &self,
        magazine: &Magazine,
        on_progress: Option<ProgressCallback>,
    ) -> Result<CachedItem> {
        let id = magazine.id.as_str();
        validate_content_id(id)?;

        if self.index.has(id) {
            return Err(OfflineError::AlreadyCached { id: id.to_string() });
        }

        if !self.in_flight.lock().insert(id.to_string()) {
            return Err(OfflineError::AlreadyDownloading { id: id.to_string() });
        }

        let result = self.acquire_inner(magazine, on_progress.as_ref()).await;
        self.in_flight.lock().remove(id);

        match &result {
            Ok(item) => info!(
                id = %item.id,
                bytes = item.blob_size_bytes,
                "Download completed"
            ),
            Err(e) => warn!(id = %id, error = %e, "Download failed"),
        }
        result
    }

    async fn acquire_inner(
        &self,
        magazine: &Magazine,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<CachedItem> {
        let id = magazine.id.as_str();

        let directory = match self.download_directory().await {
            Ok(dir) => dir,
            Err(e) => {
                emit(on_progress, DownloadProgressEvent::failed(id, 0, 0));
                return Err(e);
            }
        };
        let path = directory.join(format!("{id}.cache"));

        let payload = match self.source.payload(magazine).await {
            Ok(payload) => payload,
            Err(e) => {
                emit(on_progress, DownloadProgressEvent::failed(id, 0, 0));
                return Err(e);
            }
        };

        let total = payload.len() as u64;
        let mut transferred = 0u64;
        for chunk in payload.chunks(self.config.chunk_size_bytes.max(1)) {
            transferred += chunk.len() as u64;
            emit(
                on_progress,
                DownloadProgressEvent::in_progress(id, transferred, total),
            );
            // One suspension point per chunk keeps the scheduler responsive
            tokio::task::yield_now().await;
        }

        if let Err(e) = self.blobs.write_whole(&path, payload).await {
            self.discard_partial(&path).await;
            emit(
                on_progress,
                DownloadProgressEvent::failed(id, transferred, total),
            );
            return Err(e.into());
        }

        let item = CachedItem::new(
            magazine.clone(),
            path.to_string_lossy().into_owned(),
            total,
        );
        self.index.upsert(item.clone()).await;

        emit(on_progress, DownloadProgressEvent::completed(id, total));
        Ok(item)
    }

    async fn download_directory(&self) -> Result<PathBuf> {
        let directory = self
            .blobs
            .base_directory()
            .await?
            .join(&self.config.download_directory);
        self.blobs.ensure_directory(&directory).await?;
        Ok(directory)
    }

    /// Best-effort cleanup of a blob left behind by a failed write. The index
    /// was never updated, so the worst case here is an unreferenced file.
    async fn discard_partial(&self, path: &Path) {
        match self.blobs.exists(path).await {
            Ok(true) => {
                if let Err(e) = self.blobs.delete(path).await {
                    warn!(path = ?path, error = %e, "Failed to discard partial blob");
                }
            }
            Ok(false) => {}
            Err(e) => warn!(path = ?path, error = %e, "Could not check for partial blob"),
        }
    }

    /// Remove a cached item, blob first.
    ///
    /// The index entry is dropped only after the payload is confirmed gone;
    /// if blob deletion fails the entry is retained so storage accounting
    /// never silently loses a file.
    pub async fn release(&self, id: &str) -> Result<ReleaseOutcome> {
        let Some(item) = self.index.get(id) else {
            debug!(id = %id, "Nothing cached under id, removal is a no-op");
            return Ok(ReleaseOutcome::NotFound);
        };

        let path = PathBuf::from(&item.blob_path);
        if self.blobs.exists(&path).await? {
            self.blobs.delete(&path).await?;
        } else {
            debug!(id = %id, "Backing blob already gone");
        }

        self.index.remove(id).await;
        info!(id = %id, "Removed cached content");
        Ok(ReleaseOutcome::Removed(item))
    }

    /// Look up a cached item, verifying the backing blob still exists.
    ///
    /// A missing blob (deleted out-of-band, e.g. OS storage pressure) is not
    /// an error: the stale index entry is dropped and the item reports as not
    /// cached, recoverable by re-downloading.
    pub async fn fetch(&self, id: &str) -> Result<Option<CachedItem>> {
        let Some(item) = self.index.get(id) else {
            return Ok(None);
        };

        if self.blobs.exists(Path::new(&item.blob_path)).await? {
            Ok(Some(item))
        } else {
            warn!(id = %id, "Backing blob missing, dropping stale index entry");
            self.index.remove(id).await;
            Ok(None)
        }
    }

    /// Read a cached payload, with the same self-healing as [`fetch`].
    ///
    /// [`fetch`]: DownloadOrchestrator::fetch
    pub async fn open(&self, id: &str) -> Result<Option<(CachedItem, Bytes)>> {
        let Some(item) = self.fetch(id).await? else {
            return Ok(None);
        };

        match self.blobs.read_whole(Path::new(&item.blob_path)).await {
            Ok(payload) => Ok(Some((item, payload))),
            // The blob vanished between the existence check and the read
            Err(BridgeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(id = %id, "Backing blob vanished during read, dropping stale index entry");
                self.index.remove(id).await;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_content_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(OfflineError::InvalidContentId {
            reason: "id is empty".to_string(),
        });
    }
    if id.contains(['/', '\\']) || id.contains("..") {
        return Err(OfflineError::InvalidContentId {
            reason: format!("id contains path segments: {id}"),
        });
    }
    Ok(())
}

fn emit(on_progress: Option<&ProgressCallback>, event: DownloadProgressEvent) {
    if let Some(callback) = on_progress {
        callback(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::DownloadPhase;
    use bridge_traits::mock::{MemoryBlobStore, MemoryKeyValueStore};

    fn magazine(id: &str) -> Magazine {
        Magazine {
            id: id.to_string(),
            title: format!("Magazine {id}"),
            category: "design".to_string(),
            cover_url: String::new(),
            description: "A test issue".to_string(),
            issue: Some("2024-06".to_string()),
        }
    }

    struct Harness {
        blobs: Arc<MemoryBlobStore>,
        index: Arc<CacheIndex>,
        orchestrator: DownloadOrchestrator,
    }

    fn harness() -> Harness {
        let blobs = Arc::new(MemoryBlobStore::new());
        let prefs = Arc::new(MemoryKeyValueStore::new());
        let index = Arc::new(CacheIndex::new(prefs, "offline.cache_index"));
        let config = OfflineConfig::default().with_chunk_size(64);
        let orchestrator = DownloadOrchestrator::new(
            config,
            Arc::clone(&blobs) as Arc<dyn BlobStore>,
            Arc::clone(&index),
            Arc::new(SynthesizedPayloadSource::new()),
        );
        Harness {
            blobs,
            index,
            orchestrator,
        }
    }

    fn collecting_callback() -> (ProgressCallback, Arc<Mutex<Vec<DownloadProgressEvent>>>) {
        let events: Arc<Mutex<Vec<DownloadProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: ProgressCallback = Arc::new(move |event| sink.lock().push(event.clone()));
        (callback, events)
    }

    #[tokio::test]
    async fn acquire_commits_item_and_emits_monotonic_progress() {
        let h = harness();
        let (callback, events) = collecting_callback();

        let item = h
            .orchestrator
            .acquire(&magazine("m1"), Some(callback))
            .await
            .unwrap();

        assert_eq!(item.id, "m1");
        assert!(item.blob_size_bytes > 0);
        assert!(h.index.has("m1"));
        assert!(h.blobs.contains(Path::new(&item.blob_path)));

        let events = events.lock();
        assert!(events.len() >= 2);
        let last = events.last().unwrap();
        assert_eq!(last.phase, DownloadPhase::Completed);
        assert_eq!(last.percent, 100);
        for pair in events.windows(2) {
            assert!(pair[1].percent >= pair[0].percent);
        }
    }

    #[tokio::test]
    async fn second_acquire_fails_with_already_cached() {
        let h = harness();
        h.orchestrator.acquire(&magazine("m1"), None).await.unwrap();

        let err = h
            .orchestrator
            .acquire(&magazine("m1"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OfflineError::AlreadyCached { .. }));
        assert_eq!(h.index.len(), 1);
    }

    #[tokio::test]
    async fn failed_write_commits_nothing() {
        let h = harness();
        let (callback, events) = collecting_callback();
        h.blobs.fail_next_write();

        let err = h
            .orchestrator
            .acquire(&magazine("m1"), Some(callback))
            .await
            .unwrap_err();
        assert!(matches!(err, OfflineError::Bridge(_)));

        assert!(!h.index.has("m1"));
        assert_eq!(h.blobs.file_count(), 0);
        assert_eq!(
            events.lock().last().unwrap().phase,
            DownloadPhase::Failed
        );
    }

    #[tokio::test]
    async fn failing_payload_source_emits_failed() {
        struct BrokenSource;

        #[async_trait]
        impl PayloadSource for BrokenSource {
            async fn payload(&self, _magazine: &Magazine) -> Result<Bytes> {
                Err(OfflineError::Bridge(BridgeError::OperationFailed(
                    "catalog unreachable".to_string(),
                )))
            }
        }

        let h = harness();
        let orchestrator = DownloadOrchestrator::new(
            OfflineConfig::default(),
            Arc::clone(&h.blobs) as Arc<dyn BlobStore>,
            Arc::clone(&h.index),
            Arc::new(BrokenSource),
        );
        let (callback, events) = collecting_callback();

        assert!(orchestrator
            .acquire(&magazine("m1"), Some(callback))
            .await
            .is_err());
        assert!(!h.index.has("m1"));
        assert_eq!(events.lock().last().unwrap().phase, DownloadPhase::Failed);
    }

    #[tokio::test]
    async fn invalid_ids_are_rejected() {
        let h = harness();

        let empty = h.orchestrator.acquire(&magazine(""), None).await;
        assert!(matches!(
            empty.unwrap_err(),
            OfflineError::InvalidContentId { .. }
        ));

        let traversal = h.orchestrator.acquire(&magazine("../etc"), None).await;
        assert!(matches!(
            traversal.unwrap_err(),
            OfflineError::InvalidContentId { .. }
        ));
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let h = harness();
        h.orchestrator.acquire(&magazine("m1"), None).await.unwrap();

        let first = h.orchestrator.release("m1").await.unwrap();
        assert!(matches!(first, ReleaseOutcome::Removed(_)));
        assert_eq!(h.blobs.file_count(), 0);

        let second = h.orchestrator.release("m1").await.unwrap();
        assert_eq!(second, ReleaseOutcome::NotFound);
    }

    #[tokio::test]
    async fn release_retains_entry_when_blob_deletion_fails() {
        let h = harness();
        h.orchestrator.acquire(&magazine("m1"), None).await.unwrap();

        h.blobs.set_fail_deletes(true);
        assert!(h.orchestrator.release("m1").await.is_err());
        assert!(h.index.has("m1"));
        assert_eq!(h.blobs.file_count(), 1);

        h.blobs.set_fail_deletes(false);
        assert!(matches!(
            h.orchestrator.release("m1").await.unwrap(),
            ReleaseOutcome::Removed(_)
        ));
        assert!(!h.index.has("m1"));
    }

    #[tokio::test]
    async fn fetch_self_heals_after_out_of_band_deletion() {
        let h = harness();
        let item = h.orchestrator.acquire(&magazine("m1"), None).await.unwrap();

        assert!(h.blobs.remove_out_of_band(Path::new(&item.blob_path)));

        assert_eq!(h.orchestrator.fetch("m1").await.unwrap(), None);
        assert!(!h.index.has("m1"));

        // Re-download works afterwards
        h.orchestrator.acquire(&magazine("m1"), None).await.unwrap();
        assert!(h.orchestrator.fetch("m1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn open_returns_payload_bytes() {
        let h = harness();
        h.orchestrator.acquire(&magazine("m1"), None).await.unwrap();

        let (item, payload) = h.orchestrator.open("m1").await.unwrap().unwrap();
        assert_eq!(payload.len() as u64, item.blob_size_bytes);
        assert!(h.orchestrator.open("ghost").await.unwrap().is_none());
    }
}
