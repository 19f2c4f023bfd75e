//! Notification sink adapters.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{Notification, NotificationError, NotificationSink};

/// Sink that writes notifications to the log. The default for the demo
/// runtime, where there is no real delivery channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notification: Notification) -> Result<(), NotificationError> {
        tracing::info!(
            account_number = %notification.account_number,
            event_id = %notification.event_id,
            subject = %notification.subject,
            body = %notification.body,
            "notification"
        );
        Ok(())
    }
}

/// Sink that records delivered notifications, for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    /// Create a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything delivered so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, notification: Notification) -> Result<(), NotificationError> {
        self.delivered.lock().unwrap().push(notification);
        Ok(())
    }
}
