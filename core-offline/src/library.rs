//! Offline library facade
//!
//! The only surface the UI layer touches. Composes the cache index, download
//! orchestrator, and favorites list into one observable state surface, and
//! reports the outcome of every user-initiated operation through the
//! notification channel. Errors are logged and notified before they are
//! returned, so nothing escapes this layer unreported.

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use bridge_traits::notify::{NotificationChannel, NotificationKind};
use bridge_traits::storage::{BlobStore, KeyValueStore};

use crate::config::OfflineConfig;
use crate::error::{OfflineError, Result};
use crate::favorites::FavoritesList;
use crate::index::CacheIndex;
use crate::models::{Annotation, CachedItem, Magazine};
use crate::orchestrator::{DownloadOrchestrator, PayloadSource, ReleaseOutcome};
use crate::progress::{DownloadProgressEvent, ProgressCallback};
use crate::stats::LibraryStatistics;

/// Consumer-facing API over the offline cache subsystem.
///
/// Constructed once at application startup with its collaborators injected,
/// then shared by reference; there is no global instance.
pub struct OfflineLibrary {
    index: Arc<CacheIndex>,
    orchestrator: Arc<DownloadOrchestrator>,
    favorites: Arc<FavoritesList>,
    notifier: Arc<dyn NotificationChannel>,
    /// Transient per-id progress, purely for UI display. Entries are cleared
    /// on terminal phases so no stale in-flight indicator survives.
    active_downloads: Arc<Mutex<HashMap<String, DownloadProgressEvent>>>,
}

impl std::fmt::Debug for OfflineLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineLibrary").finish_non_exhaustive()
    }
}

impl OfflineLibrary {
    pub fn new(
        config: OfflineConfig,
        blobs: Arc<dyn BlobStore>,
        prefs: Arc<dyn KeyValueStore>,
        source: Arc<dyn PayloadSource>,
        notifier: Arc<dyn NotificationChannel>,
    ) -> Result<Self> {
        config.validate().map_err(|message| OfflineError::InvalidInput {
            field: "config".to_string(),
            message,
        })?;

        let index = Arc::new(CacheIndex::new(Arc::clone(&prefs), &config.index_key));
        let favorites = Arc::new(FavoritesList::new(prefs, &config.favorites_key));
        let orchestrator = Arc::new(DownloadOrchestrator::new(
            config,
            blobs,
            Arc::clone(&index),
            source,
        ));

        Ok(Self {
            index,
            orchestrator,
            favorites,
            notifier,
            active_downloads: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Load both persisted lists. Returns `(cached, favorites)` counts.
    pub async fn load(&self) -> (usize, usize) {
        let cached = self.index.load().await;
        let favorites = self.favorites.load().await;
        (cached, favorites)
    }

    // =========================================================================
    // Downloads
    // =========================================================================

    /// Download a magazine for offline reading.
    ///
    /// Progress events flow into the transient progress map (and the caller's
    /// callback, if any); the entry is cleared once the download reaches a
    /// terminal phase, success or failure.
    pub async fn download_content(
        &self,
        magazine: &Magazine,
        on_progress: Option<ProgressCallback>,
    ) -> Result<CachedItem> {
        let id = magazine.id.clone();

        let active = Arc::clone(&self.active_downloads);
        let tracker: ProgressCallback = Arc::new(move |event: &DownloadProgressEvent| {
            active.lock().insert(event.content_id.clone(), event.clone());
            if let Some(callback) = &on_progress {
                callback(event);
            }
        });

        let result = self.orchestrator.acquire(magazine, Some(tracker)).await;
        self.active_downloads.lock().remove(&id);

        match &result {
            Ok(item) => {
                self.notifier
                    .notify(
                        &format!("Downloaded \"{}\" for offline reading", item.magazine.title),
                        NotificationKind::Success,
                    )
                    .await;
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Download request failed");
                self.notifier
                    .notify(
                        &format!("Could not download \"{}\": {e}", magazine.title),
                        NotificationKind::Error,
                    )
                    .await;
            }
        }
        result
    }

    /// Remove a downloaded magazine and its payload.
    pub async fn remove_content(&self, id: &str) -> Result<ReleaseOutcome> {
        let result = self.orchestrator.release(id).await;

        match &result {
            Ok(ReleaseOutcome::Removed(item)) => {
                self.notifier
                    .notify(
                        &format!("Removed \"{}\" from downloads", item.magazine.title),
                        NotificationKind::Success,
                    )
                    .await;
                let stats = self.compute_statistics();
                debug!(
                    count = stats.total_cached_count,
                    bytes = stats.total_bytes_used,
                    "Statistics after removal"
                );
            }
            Ok(ReleaseOutcome::NotFound) => {
                self.notifier
                    .notify(
                        &format!("\"{id}\" is not downloaded"),
                        NotificationKind::Error,
                    )
                    .await;
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Removal failed");
                self.notifier
                    .notify(
                        &format!("Could not remove download: {e}"),
                        NotificationKind::Error,
                    )
                    .await;
            }
        }
        result
    }

    /// Remove every downloaded magazine. Favorites are untouched. Returns
    /// the number of items removed; items whose blob cannot be deleted are
    /// retained and logged.
    pub async fn clear_all(&self) -> usize {
        let ids = self.index.ids();
        let total = ids.len();
        let mut removed = 0usize;
        for id in ids {
            match self.orchestrator.release(&id).await {
                Ok(ReleaseOutcome::Removed(_)) => removed += 1,
                Ok(ReleaseOutcome::NotFound) => {}
                Err(e) => warn!(id = %id, error = %e, "Failed to clear cached item"),
            }
        }

        if removed < total {
            self.notifier
                .notify(
                    &format!("Removed {removed} of {total} downloads"),
                    NotificationKind::Error,
                )
                .await;
        } else {
            self.notifier
                .notify(
                    &format!("Removed {removed} downloads"),
                    NotificationKind::Success,
                )
                .await;
        }
        removed
    }

    /// Open cached content for reading. Stamps the access time.
    ///
    /// Returns `None` if the item is not (or no longer) available offline;
    /// the stale case self-corrects and is reported to the user.
    pub async fn open_content(&self, id: &str) -> Result<Option<(CachedItem, Bytes)>> {
        match self.orchestrator.open(id).await {
            Ok(Some((_, payload))) => {
                let item = self
                    .index
                    .update(id, CachedItem::record_access)
                    .await
                    .ok_or_else(|| OfflineError::InvalidInput {
                        field: "id".to_string(),
                        message: format!("entry vanished while opening: {id}"),
                    })?;
                Ok(Some((item, payload)))
            }
            Ok(None) => {
                self.notifier
                    .notify(
                        "This issue is no longer available offline",
                        NotificationKind::Error,
                    )
                    .await;
                Ok(None)
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to open cached content");
                self.notifier
                    .notify(
                        &format!("Could not open download: {e}"),
                        NotificationKind::Error,
                    )
                    .await;
                Err(e)
            }
        }
    }

    /// Availability check that also self-heals stale entries.
    pub async fn fetch(&self, id: &str) -> Result<Option<CachedItem>> {
        self.orchestrator.fetch(id).await
    }

    // =========================================================================
    // Reading state
    // =========================================================================

    /// Update how far the user has read. Clamped to 0-100. Returns whether
    /// the item exists.
    pub async fn update_consumption_progress(&self, id: &str, percent: u8) -> bool {
        let updated = self
            .index
            .update(id, |item| item.set_consumption_progress(percent))
            .await;
        debug!(id = %id, percent = percent, found = updated.is_some(), "Updated reading progress");
        updated.is_some()
    }

    /// Add an annotation to a cached item. Returns `None` if the item is not
    /// cached.
    pub async fn add_annotation(
        &self,
        id: &str,
        position: u32,
        label: &str,
        note: Option<&str>,
    ) -> Result<Option<Annotation>> {
        if label.trim().is_empty() {
            return Err(OfflineError::InvalidInput {
                field: "label".to_string(),
                message: "annotation label cannot be empty".to_string(),
            });
        }

        let mut created = None;
        let updated = self
            .index
            .update(id, |item| {
                created = Some(item.add_annotation(position, label, note));
            })
            .await;

        Ok(updated.and(created))
    }

    /// Remove an annotation from a cached item. Returns whether one was
    /// removed.
    pub async fn remove_annotation(&self, id: &str, annotation_id: &str) -> bool {
        let mut removed = false;
        self.index
            .update(id, |item| {
                removed = item.remove_annotation(annotation_id);
            })
            .await;
        removed
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Toggle favorite status. Independent of the cache: favoriting never
    /// downloads and unfavoriting never deletes. Returns whether the item is
    /// a favorite after the call.
    pub async fn toggle_favorite(&self, magazine: &Magazine) -> bool {
        let now_favorite = self.favorites.toggle(magazine).await;

        let message = if now_favorite {
            format!("Added \"{}\" to bookmarks", magazine.title)
        } else {
            format!("Removed \"{}\" from bookmarks", magazine.title)
        };
        self.notifier
            .notify(&message, NotificationKind::Success)
            .await;
        now_favorite
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn favorite_items(&self) -> Vec<Magazine> {
        self.favorites.get_all()
    }

    // =========================================================================
    // Read surface
    // =========================================================================

    pub fn is_cached(&self, id: &str) -> bool {
        self.index.has(id)
    }

    /// All cached items, most recently acquired first.
    pub fn cached_items(&self) -> Vec<CachedItem> {
        self.index.get_all()
    }

    /// Snapshot of in-flight download progress, for UI indicators.
    pub fn active_downloads(&self) -> Vec<DownloadProgressEvent> {
        self.active_downloads.lock().values().cloned().collect()
    }

    /// Aggregate statistics, derived fresh from the index on every call.
    pub fn compute_statistics(&self) -> LibraryStatistics {
        LibraryStatistics::compute(&self.index.get_all())
    }
}
