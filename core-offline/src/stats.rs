//! Library statistics
//!
//! Derived aggregates over the cache index. Always recomputed from the
//! authoritative map, never stored, so they cannot drift.

use serde::{Deserialize, Serialize};

use crate::models::CachedItem;

/// Aggregate statistics over the cached library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryStatistics {
    /// Number of items currently cached
    pub total_cached_count: usize,

    /// Sum of blob sizes across cached items
    pub total_bytes_used: u64,

    /// Mean reading progress across cached items (0.0 when empty)
    pub average_consumption: f64,

    /// Unix timestamp of the most recent successful download
    pub most_recent_acquisition: Option<i64>,
}

impl LibraryStatistics {
    /// Compute statistics from the current index contents.
    pub fn compute(items: &[CachedItem]) -> Self {
        let total_cached_count = items.len();
        let total_bytes_used = items.iter().map(|i| i.blob_size_bytes).sum();
        let average_consumption = if items.is_empty() {
            0.0
        } else {
            items
                .iter()
                .map(|i| f64::from(i.consumption_progress))
                .sum::<f64>()
                / items.len() as f64
        };
        let most_recent_acquisition = items.iter().map(|i| i.acquired_at).max();

        Self {
            total_cached_count,
            total_bytes_used,
            average_consumption,
            most_recent_acquisition,
        }
    }

    /// Average bytes per cached item.
    pub fn average_item_size(&self) -> u64 {
        if self.total_cached_count == 0 {
            0
        } else {
            self.total_bytes_used / self.total_cached_count as u64
        }
    }

    /// Storage usage as a human-readable string.
    pub fn usage_string(&self) -> String {
        format_bytes(self.total_bytes_used)
    }
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
