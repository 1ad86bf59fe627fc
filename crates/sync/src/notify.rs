//! Transient user notifications emitted by writes.
//!
//! Writes report their outcome through a [`Notifier`] instead of returning UI
//! concerns to the caller. The view layer decides how to render them.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Outcome category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A short-lived message about a finished write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    /// Name of the write that produced it.
    pub operation: &'static str,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            operation,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            operation,
            message: message.into(),
        }
    }
}

/// Sink for write notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Logs notifications and records them as Sentry breadcrumbs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                info!(operation = notification.operation, message = %notification.message, "Notification");
            }
            NotificationLevel::Error => {
                warn!(operation = notification.operation, message = %notification.message, "Notification");
            }
        }

        add_breadcrumb(&notification);
    }
}

/// Forwards notifications to a UI loop over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver the UI should drain.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            warn!("Notification receiver dropped");
        }
    }
}

/// Add a breadcrumb for a write outcome.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
fn add_breadcrumb(notification: &Notification) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some("sync.write".to_string()),
        message: Some(notification.message.clone()),
        level: match notification.level {
            NotificationLevel::Success => sentry::Level::Info,
            NotificationLevel::Error => sentry::Level::Error,
        },
        ..Default::default()
    };

    breadcrumb.data.insert(
        "operation".to_string(),
        serde_json::Value::String(notification.operation.to_string()),
    );

    sentry::add_breadcrumb(breadcrumb);
}
