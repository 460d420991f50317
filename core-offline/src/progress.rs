//! Download progress events
//!
//! Ephemeral progress reporting for in-flight downloads. Events are never
//! persisted; they exist only to drive UI indicators.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Phase of a download, as observed through progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadPhase {
    /// Chunks are being transferred.
    InProgress,
    /// The payload was committed and the item is cached.
    Completed,
    /// The acquisition aborted; nothing was committed.
    Failed,
    /// Reserved for future pause support; never emitted today.
    Paused,
}

impl DownloadPhase {
    /// Whether this phase ends the download (no further events follow).
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadPhase::Completed | DownloadPhase::Failed)
    }
}

/// Progress snapshot for one in-flight download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadProgressEvent {
    pub content_id: String,
    /// 0-100, monotonically non-decreasing over one acquisition.
    pub percent: u8,
    pub bytes_transferred: u64,
    pub total_bytes: u64,
    pub phase: DownloadPhase,
}

impl DownloadProgressEvent {
    pub fn in_progress(content_id: &str, bytes_transferred: u64, total_bytes: u64) -> Self {
        Self {
            content_id: content_id.to_string(),
            percent: percent_of(bytes_transferred, total_bytes),
            bytes_transferred,
            total_bytes,
            phase: DownloadPhase::InProgress,
        }
    }

    pub fn completed(content_id: &str, total_bytes: u64) -> Self {
        Self {
            content_id: content_id.to_string(),
            percent: 100,
            bytes_transferred: total_bytes,
            total_bytes,
            phase: DownloadPhase::Completed,
        }
    }

    pub fn failed(content_id: &str, bytes_transferred: u64, total_bytes: u64) -> Self {
        Self {
            content_id: content_id.to_string(),
            percent: percent_of(bytes_transferred, total_bytes),
            bytes_transferred,
            total_bytes,
            phase: DownloadPhase::Failed,
        }
    }
}

/// Observer invoked after every emitted progress event.
pub type ProgressCallback = Arc<dyn Fn(&DownloadProgressEvent) + Send + Sync>;

fn percent_of(transferred: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((transferred.saturating_mul(100)) / total).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_computed_and_clamped() {
        let event = DownloadProgressEvent::in_progress("m1", 400, 1000);
        assert_eq!(event.percent, 40);
        assert_eq!(event.phase, DownloadPhase::InProgress);

        let over = DownloadProgressEvent::in_progress("m1", 2000, 1000);
        assert_eq!(over.percent, 100);

        let empty = DownloadProgressEvent::in_progress("m1", 0, 0);
        assert_eq!(empty.percent, 0);
    }

    #[test]
    fn completed_reports_full_transfer() {
        let event = DownloadProgressEvent::completed("m1", 1000);
        assert_eq!(event.percent, 100);
        assert_eq!(event.bytes_transferred, 1000);
        assert!(event.phase.is_terminal());
    }

    #[test]
    fn terminal_phases() {
        assert!(DownloadPhase::Completed.is_terminal());
        assert!(DownloadPhase::Failed.is_terminal());
        assert!(!DownloadPhase::InProgress.is_terminal());
        assert!(!DownloadPhase::Paused.is_terminal());
    }

    #[test]
    fn events_serialize_with_snake_case_phase() {
        let event = DownloadProgressEvent::failed("m1", 10, 100);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"failed\""));

        let back: DownloadProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
