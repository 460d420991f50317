//! Favorites list
//!
//! Catalog items the user wants to find again. Pure metadata, no payload,
//! fully independent of the cache index: an item can be favorited, cached,
//! both, or neither, and the two lists never synchronize implicitly.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use bridge_traits::storage::KeyValueStore;

use crate::models::{decode_list, encode_list, Magazine};

/// Persisted list of favorited catalog records, unique by content id.
pub struct FavoritesList {
    store: Arc<dyn KeyValueStore>,
    key: String,
    entries: Mutex<Vec<Magazine>>,
}

impl FavoritesList {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Rebuild the list from the persisted mirror, replacing any previous
    /// contents; tolerant of missing or corrupt data, same policy as the
    /// cache index. Returns the number loaded.
    pub async fn load(&self) -> usize {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return 0,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read persisted favorites, starting empty");
                return 0;
            }
        };

        let Some(items) = decode_list::<Magazine>(&raw) else {
            warn!(key = %self.key, "Corrupt persisted favorites, starting empty");
            return 0;
        };

        let mut entries = self.entries.lock();
        entries.clear();
        for magazine in items.into_iter().filter(|m| !m.id.is_empty()) {
            if !entries.iter().any(|m| m.id == magazine.id) {
                entries.push(magazine);
            }
        }
        debug!(count = entries.len(), "Loaded favorites");
        entries.len()
    }

    async fn persist(&self) {
        let items = self.entries.lock().clone();
        let raw = match encode_list(&items) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to serialize favorites");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &raw).await {
            warn!(key = %self.key, error = %e, "Failed to persist favorites");
        }
    }

    /// Toggle favorite status for a catalog record.
    ///
    /// Uniqueness is enforced by filtering on id before appending, so calling
    /// this twice always returns to the prior state. Returns whether the item
    /// is a favorite after the call.
    pub async fn toggle(&self, magazine: &Magazine) -> bool {
        let now_favorite = {
            let mut entries = self.entries.lock();
            let before = entries.len();
            entries.retain(|m| m.id != magazine.id);
            if entries.len() == before {
                entries.push(magazine.clone());
                true
            } else {
                false
            }
        };

        self.persist().await;
        debug!(id = %magazine.id, favorite = now_favorite, "Toggled favorite");
        now_favorite
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().iter().any(|m| m.id == id)
    }

    /// All favorites in insertion order.
    pub fn get_all(&self) -> Vec<Magazine> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::mock::MemoryKeyValueStore;

    fn magazine(id: &str) -> Magazine {
        Magazine {
            id: id.to_string(),
            title: format!("Magazine {id}"),
            category: "travel".to_string(),
            cover_url: String::new(),
            description: String::new(),
            issue: None,
        }
    }

    fn favorites_over(store: Arc<MemoryKeyValueStore>) -> FavoritesList {
        FavoritesList::new(store, "offline.favorites")
    }

    #[tokio::test]
    async fn toggle_twice_returns_to_original_state() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let favorites = favorites_over(store);
        let m2 = magazine("m2");

        assert!(favorites.toggle(&m2).await);
        assert!(favorites.contains("m2"));
        assert_eq!(favorites.len(), 1);

        assert!(!favorites.toggle(&m2).await);
        assert!(!favorites.contains("m2"));
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn no_duplicates_even_with_repeated_adds() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let favorites = favorites_over(store);

        favorites.toggle(&magazine("m1")).await; // add
        favorites.toggle(&magazine("m1")).await; // remove
        favorites.toggle(&magazine("m1")).await; // add again

        assert_eq!(favorites.len(), 1);
    }

    #[tokio::test]
    async fn survives_reload_through_mirror() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let favorites = favorites_over(Arc::clone(&store));

        favorites.toggle(&magazine("m1")).await;
        favorites.toggle(&magazine("m2")).await;

        let reloaded = favorites_over(store);
        assert_eq!(reloaded.load().await, 2);
        assert!(reloaded.contains("m1"));
        assert!(reloaded.contains("m2"));
    }

    #[tokio::test]
    async fn load_tolerates_corrupt_payload() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.seed("offline.favorites", "[not json");
        let favorites = favorites_over(store);

        assert_eq!(favorites.load().await, 0);
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn load_replaces_rather_than_merges() {
        let raw = encode_list(&[magazine("m1")]).unwrap();
        let store = Arc::new(MemoryKeyValueStore::new());
        store.seed("offline.favorites", &raw);
        let favorites = favorites_over(store);

        assert_eq!(favorites.load().await, 1);
        assert_eq!(favorites.load().await, 1);
        assert_eq!(favorites.len(), 1);
    }

    #[tokio::test]
    async fn load_drops_duplicate_and_blank_ids() {
        let raw = encode_list(&[magazine("m1"), magazine("m1"), magazine("")]).unwrap();
        let store = Arc::new(MemoryKeyValueStore::new());
        store.seed("offline.favorites", &raw);
        let favorites = favorites_over(store);

        assert_eq!(favorites.load().await, 1);
    }
}
