//! Cache index
//!
//! The authoritative in-memory map from content id to [`CachedItem`], with a
//! durable mirror in the key-value store. The in-memory map is the source of
//! truth for the running session; persistence is best-effort and failures are
//! logged, not raised.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use bridge_traits::storage::KeyValueStore;

use crate::models::{decode_list, encode_list, CachedItem};

/// Authoritative map of cached content, mirrored into the key-value store.
///
/// Map mutations are synchronous single steps; only the surrounding
/// persistence I/O suspends. That keeps reads and writes of the map itself
/// atomic under a cooperative scheduler without holding a lock across an
/// `await`.
pub struct CacheIndex {
    store: Arc<dyn KeyValueStore>,
    key: String,
    entries: Mutex<HashMap<String, CachedItem>>,
}

impl CacheIndex {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Rebuild the map from the persisted mirror, replacing any previous
    /// contents.
    ///
    /// A missing key, unreadable store, or corrupt payload all initialize an
    /// empty index; none of these are fatal. Records that fail validation are
    /// skipped. Returns the number of entries loaded.
    pub async fn load(&self) -> usize {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No persisted cache index, starting empty");
                return 0;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read persisted cache index, starting empty");
                return 0;
            }
        };

        let Some(items) = decode_list::<CachedItem>(&raw) else {
            warn!(key = %self.key, "Corrupt persisted cache index, starting empty");
            return 0;
        };

        let total = items.len();
        let mut entries = self.entries.lock();
        entries.clear();
        for item in items.into_iter().filter(CachedItem::is_valid) {
            entries.insert(item.id.clone(), item);
        }

        let loaded = entries.len();
        if loaded < total {
            warn!(
                skipped = total - loaded,
                "Skipped invalid records in persisted cache index"
            );
        }
        debug!(count = loaded, "Loaded cache index");
        loaded
    }

    /// Mirror the current map into the key-value store.
    ///
    /// Write failures are logged and swallowed; the in-memory map stays the
    /// source of truth for the session.
    pub async fn persist(&self) {
        let mut items: Vec<CachedItem> = self.entries.lock().values().cloned().collect();
        items.sort_by(|a, b| a.acquired_at.cmp(&b.acquired_at));

        let raw = match encode_list(&items) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cache index");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &raw).await {
            warn!(key = %self.key, error = %e, "Failed to persist cache index");
        }
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<CachedItem> {
        self.entries.lock().get(id).cloned()
    }

    /// All entries, most recently acquired first.
    pub fn get_all(&self) -> Vec<CachedItem> {
        let mut items: Vec<CachedItem> = self.entries.lock().values().cloned().collect();
        items.sort_by(|a, b| b.acquired_at.cmp(&a.acquired_at));
        items
    }

    /// Ids of all current entries.
    pub fn ids(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Insert or replace an entry and mirror the change.
    pub async fn upsert(&self, item: CachedItem) {
        self.entries.lock().insert(item.id.clone(), item);
        self.persist().await;
    }

    /// Remove an entry and mirror the change. Removing an absent id is a
    /// no-op that also skips the persistence write.
    pub async fn remove(&self, id: &str) -> Option<CachedItem> {
        let removed = self.entries.lock().remove(id);
        if removed.is_some() {
            self.persist().await;
        }
        removed
    }

    /// Apply an in-place mutation to one entry, then mirror the change.
    /// Returns the updated entry, or `None` if the id is absent.
    pub async fn update<F>(&self, id: &str, f: F) -> Option<CachedItem>
    where
        F: FnOnce(&mut CachedItem),
    {
        let updated = {
            let mut entries = self.entries.lock();
            entries.get_mut(id).map(|item| {
                f(item);
                item.clone()
            })
        };

        if updated.is_some() {
            self.persist().await;
        }
        updated
    }
}
