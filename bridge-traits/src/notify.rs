//! User Notification Abstraction
//!
//! The core reports the outcome of every user-initiated operation through a
//! single narrow channel; the surrounding UI owns how it is rendered (toast,
//! snackbar, alert).

use async_trait::async_trait;

/// Classification of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// User-facing notification channel
///
/// Delivery is fire-and-forget: the core never blocks on or reacts to the
/// fate of a notification. Implementations swallow their own delivery errors.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Surface a message to the user.
    async fn notify(&self, message: &str, kind: NotificationKind);
}
