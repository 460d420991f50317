//! # Offline Content Module
//!
//! Provides offline caching of magazine issues for reading without network
//! access.
//!
//! ## Overview
//!
//! This module handles:
//! - Downloading issue payloads with observable, chunked progress
//! - An authoritative in-memory cache index mirrored to a key-value store
//! - Favorites, reading progress, and annotations on cached items
//! - Aggregate library statistics, recomputed on demand
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     OfflineLibrary                     │
//! │  - download_content()                  │
//! │  - remove_content()                    │
//! │  - open_content()                      │
//! │  - toggle_favorite()                   │
//! └────────┬───────────────────────────────┘
//!          │
//!          ├──> DownloadOrchestrator ──> PayloadSource (bytes)
//!          │         │                   BlobStore (payload files)
//!          ├──> CacheIndex ───────────> KeyValueStore (mirror)
//!          ├──> FavoritesList ────────> KeyValueStore (mirror)
//!          └──> NotificationChannel (user-facing outcomes)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_offline::{OfflineConfig, OfflineLibrary, SynthesizedPayloadSource};
//!
//! # async fn example(
//! #     blobs: std::sync::Arc<dyn bridge_traits::BlobStore>,
//! #     prefs: std::sync::Arc<dyn bridge_traits::KeyValueStore>,
//! #     notifier: std::sync::Arc<dyn bridge_traits::NotificationChannel>,
//! #     magazine: core_offline::Magazine,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let library = OfflineLibrary::new(
//!     OfflineConfig::default(),
//!     blobs,
//!     prefs,
//!     std::sync::Arc::new(SynthesizedPayloadSource::new()),
//!     notifier,
//! )?;
//! library.load().await;
//!
//! let item = library.download_content(&magazine, None).await?;
//! println!("Cached {} bytes", item.blob_size_bytes);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod favorites;
pub mod index;
pub mod library;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod stats;

pub use config::OfflineConfig;
pub use error::{OfflineError, Result};
pub use favorites::FavoritesList;
pub use index::CacheIndex;
pub use library::OfflineLibrary;
pub use models::{Annotation, CachedItem, Magazine};
pub use orchestrator::{
    DownloadOrchestrator, PayloadSource, ReleaseOutcome, SynthesizedPayloadSource,
};
pub use progress::{DownloadPhase, DownloadProgressEvent, ProgressCallback};
pub use stats::LibraryStatistics;
