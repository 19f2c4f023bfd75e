//! Broker Port (Driven Port)
//!
//! Publish/subscribe interface with at-least-once delivery semantics.
//! Ordering is guaranteed only within one partition: all events published
//! with the same partition key land on the same partition in publish order.
//! Unacknowledged deliveries are re-delivered when a consumer group
//! resubscribes.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::events::{EventEnvelope, Topic};

/// Broker interaction error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    /// The broker cannot be reached.
    #[error("Broker unavailable: {message}")]
    Unavailable {
        /// Error description.
        message: String,
    },

    /// Unknown consumer group or partition in an acknowledgment.
    #[error("Unknown subscription: {message}")]
    UnknownSubscription {
        /// Error description.
        message: String,
    },
}

/// One delivered envelope, tagged with its partition and offset so the
/// consumer can acknowledge it.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Partition the envelope was routed to.
    pub partition: usize,
    /// Offset within the partition log.
    pub offset: u64,
    /// The envelope itself.
    pub envelope: EventEnvelope,
}

/// A consumer group's view of a topic: one ordered stream per partition.
///
/// Consuming the partitions concurrently is safe; ordering is only promised
/// within each partition.
#[derive(Debug)]
pub struct Subscription {
    /// Subscribed topic.
    pub topic: Topic,
    /// Consumer group name.
    pub consumer_group: String,
    /// One receiver per partition, index == partition number.
    pub partitions: Vec<mpsc::UnboundedReceiver<Delivery>>,
}

/// Port for the message broker.
#[async_trait]
pub trait BrokerPort: Send + Sync {
    /// Publish an envelope, routed by partition key.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the broker cannot accept the envelope. The
    /// caller retries with backoff; the already-committed state transition
    /// is never rolled back.
    async fn publish(
        &self,
        topic: Topic,
        partition_key: &str,
        envelope: EventEnvelope,
    ) -> Result<(), BrokerError>;

    /// Subscribe a consumer group to a topic.
    ///
    /// Delivery resumes from the group's last acknowledged offset, so
    /// anything unacknowledged before a restart is delivered again.
    ///
    /// # Errors
    ///
    /// Returns error if the subscription cannot be established.
    async fn subscribe(&self, topic: Topic, consumer_group: &str)
        -> Result<Subscription, BrokerError>;

    /// Acknowledge a delivery, advancing the group's committed offset.
    ///
    /// # Errors
    ///
    /// Returns error for an unknown (group, partition) pair.
    async fn ack(
        &self,
        topic: Topic,
        consumer_group: &str,
        partition: usize,
        offset: u64,
    ) -> Result<(), BrokerError>;
}
