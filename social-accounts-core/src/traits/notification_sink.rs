//! Notification sink abstract Trait

use crate::notification::Notification;

/// Notification Sink Trait
///
/// Fire-and-forget presentation of outcomes (toast, banner, log line, ...).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that drops every notification
pub struct NoopNotificationSink;

impl NotificationSink for NoopNotificationSink {
    fn notify(&self, notification: Notification) {
        log::debug!("Notification dropped: {notification:?}");
    }
}
