//! Event Consumers
//!
//! Background consumers fed by broker subscriptions: the portfolio
//! projection updater and the notification consumer. Both are idempotent
//! under at-least-once delivery.

mod notification_consumer;
mod projection_updater;

pub use notification_consumer::{NotificationConsumer, NotifyError};
pub use projection_updater::{ProjectionError, ProjectionUpdater};
