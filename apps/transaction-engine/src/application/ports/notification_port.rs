//! Notification Sink Port (Driven Port)
//!
//! Delivery channel for user-visible notifications rendered from events.

use async_trait::async_trait;

use crate::domain::shared::{AccountNumber, EventId, Timestamp};

/// Notification delivery error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    /// The delivery channel failed.
    #[error("Notification delivery failed: {message}")]
    DeliveryFailed {
        /// Error description.
        message: String,
    },
}

/// A rendered, user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Account the notification is addressed to.
    pub account_number: AccountNumber,
    /// Short subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Event that produced this notification.
    pub event_id: EventId,
    /// When the notification was rendered.
    pub rendered_at: Timestamp,
}

/// Port for delivering notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification.
    ///
    /// # Errors
    ///
    /// Returns error if the channel rejects the notification.
    async fn deliver(&self, notification: Notification) -> Result<(), NotificationError>;
}
