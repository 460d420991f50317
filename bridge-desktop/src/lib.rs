//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits
//! using desktop-appropriate mechanisms:
//! - `BlobStore` using `tokio::fs` under the platform data directory
//! - `KeyValueStore` as one file per key under the platform config directory
//! - `NotificationChannel` routed into `tracing` (headless hosts)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{FileKeyValueStore, TokioBlobStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let blobs = TokioBlobStore::new();
//!     let prefs = FileKeyValueStore::new();
//!
//!     // Hand both to the offline library at startup
//! }
//! ```

mod filesystem;
mod keyvalue;
mod notifications;

pub use filesystem::TokioBlobStore;
pub use keyvalue::FileKeyValueStore;
pub use notifications::LogNotifier;
