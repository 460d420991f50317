//! Notification Channel backed by Tracing
//!
//! Desktop builds without a windowing shell still need somewhere for user
//! notifications to land; this routes them into the log stream.

use async_trait::async_trait;
use bridge_traits::notify::{NotificationChannel, NotificationKind};
use tracing::{error, info};

/// Notification channel that logs instead of rendering.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for LogNotifier {
    async fn notify(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Success => info!(message = message, "User notification"),
            NotificationKind::Error => error!(message = message, "User notification"),
        }
    }
}
