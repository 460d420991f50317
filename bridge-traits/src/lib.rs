//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the offline library core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that is provided differently per platform (desktop, iOS,
//! Android):
//!
//! - [`BlobStore`](storage::BlobStore) - Durable, app-scoped binary payload
//!   storage (filesystem, SAF, OPFS)
//! - [`KeyValueStore`](storage::KeyValueStore) - Persistent string-keyed
//!   preferences storage (config files, UserDefaults, SharedPreferences)
//! - [`NotificationChannel`](notify::NotificationChannel) - User-facing
//!   success/error reporting (toasts, alerts, log sinks)
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError) for consistent
//! error handling. Platform implementations should convert platform-specific
//! errors to `BridgeError` and include context (file paths, key names).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so implementations can be
//! shared across async tasks behind `Arc<dyn Trait>`.
//!
//! ## Testing
//!
//! The [`mock`] module ships in-memory implementations of every trait with
//! failure injection, so the core can be tested without touching the real
//! filesystem.

pub mod error;
pub mod mock;
pub mod notify;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use notify::{NotificationChannel, NotificationKind};
pub use storage::{BlobMetadata, BlobStore, KeyValueStore};
