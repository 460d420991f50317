//! Domain models for the offline library
//!
//! Catalog records, cached content entries, in-content annotations, and the
//! versioned envelope both persisted lists are stored in.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Schema version written into every persisted list envelope.
pub const PERSISTED_SCHEMA_VERSION: u32 = 1;

// =============================================================================
// Catalog contract
// =============================================================================

/// Catalog record for a magazine, as supplied by the catalog API.
///
/// Only `id` is interpreted by the offline subsystem (it must be stable and
/// non-empty); every other field is stored at download time and replayed back
/// to the UI unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Magazine {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub issue: Option<String>,
}

// =============================================================================
// Cached content
// =============================================================================

/// One durably stored content unit.
///
/// Created only by a completed download, mutated by reading-progress and
/// annotation updates, destroyed by explicit removal. The `magazine` field is
/// a snapshot taken at download time and is never re-fetched, so it can go
/// stale relative to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedItem {
    pub id: String,
    pub magazine: Magazine,
    /// Unix timestamp (seconds) of successful download completion.
    pub acquired_at: i64,
    /// Opaque handle into the blob store. Never exposed to the UI layer.
    pub(crate) blob_path: String,
    pub blob_size_bytes: u64,
    /// Unix timestamp (seconds) of the last open or progress update.
    #[serde(default)]
    pub last_accessed_at: Option<i64>,
    /// Percentage of the content the user has read (0-100). Independent of
    /// download progress.
    #[serde(default)]
    pub consumption_progress: u8,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl CachedItem {
    /// Build a fresh entry for a just-completed download.
    pub fn new(magazine: Magazine, blob_path: String, blob_size_bytes: u64) -> Self {
        Self {
            id: magazine.id.clone(),
            magazine,
            acquired_at: Utc::now().timestamp(),
            blob_path,
            blob_size_bytes,
            last_accessed_at: None,
            consumption_progress: 0,
            annotations: Vec::new(),
        }
    }

    /// Whether a persisted record is usable. Invalid records are skipped at
    /// load time rather than trusted.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && self.id == self.magazine.id
            && !self.blob_path.is_empty()
            && self.consumption_progress <= 100
    }

    /// Stamp the last-accessed time.
    pub fn record_access(&mut self) {
        self.last_accessed_at = Some(Utc::now().timestamp());
    }

    /// Update reading progress, clamped to 0-100, and stamp access time.
    pub fn set_consumption_progress(&mut self, percent: u8) {
        self.consumption_progress = percent.min(100);
        self.record_access();
    }

    /// Create and attach an annotation at `position`.
    ///
    /// Annotation ids are derived from the parent id plus the creation time
    /// in milliseconds and are unique within this item.
    pub fn add_annotation(&mut self, position: u32, label: &str, note: Option<&str>) -> Annotation {
        let mut millis = Utc::now().timestamp_millis();
        while self
            .annotations
            .iter()
            .any(|a| a.id == format!("{}-{}", self.id, millis))
        {
            millis += 1;
        }

        let annotation = Annotation {
            id: format!("{}-{}", self.id, millis),
            position,
            label: label.to_string(),
            note: note.map(str::to_string),
            created_at: millis / 1000,
        };
        self.annotations.push(annotation.clone());
        annotation
    }

    /// Remove an annotation by id. Returns whether one was removed.
    pub fn remove_annotation(&mut self, annotation_id: &str) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != annotation_id);
        self.annotations.len() != before
    }
}

/// A user-created marker inside a cached item.
///
/// Distinct from library-level favorites: annotations live inside one item
/// and are discarded together with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique within the parent item, not globally.
    pub id: String,
    /// Page or position within the content.
    pub position: u32,
    pub label: String,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: i64,
}

// =============================================================================
// Persisted envelope
// =============================================================================

/// Versioned wrapper both persisted lists (cache index, favorites) are
/// serialized into.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedList<T> {
    pub version: u32,
    pub items: Vec<T>,
}

/// Serialize a list into the current envelope.
pub fn encode_list<T: Serialize + Clone>(items: &[T]) -> serde_json::Result<String> {
    serde_json::to_string(&PersistedList {
        version: PERSISTED_SCHEMA_VERSION,
        items: items.to_vec(),
    })
}

/// Decode a persisted list, tolerating earlier shapes.
///
/// Accepts the current versioned envelope and the legacy bare JSON array
/// (upgraded in memory; the next persist rewrites it as v1). Returns `None`
/// for unparseable input or an unknown version; callers treat that as "no
/// data yet".
pub fn decode_list<T: DeserializeOwned>(raw: &str) -> Option<Vec<T>> {
    if let Ok(envelope) = serde_json::from_str::<PersistedList<T>>(raw) {
        if envelope.version == PERSISTED_SCHEMA_VERSION {
            return Some(envelope.items);
        }
        warn!(
            version = envelope.version,
            "Unknown persisted schema version, starting empty"
        );
        return None;
    }

    // Legacy shape: a bare array of records
    serde_json::from_str::<Vec<T>>(raw).ok()
}
