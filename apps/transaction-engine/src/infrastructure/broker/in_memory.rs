//! In-memory message broker with partitioned, at-least-once delivery.
//!
//! Envelopes are appended to per-partition logs and pushed to live
//! subscribers. Each consumer group tracks a committed offset per
//! partition; resubscribing replays everything after the committed offset,
//! which is where at-least-once redelivery comes from. Ordering is
//! promised only within a partition, and the partition is chosen by
//! hashing the partition key.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::events::{EventEnvelope, Topic};
use crate::application::ports::{BrokerError, BrokerPort, Delivery, Subscription};

/// Default number of partitions per topic.
pub const DEFAULT_PARTITION_COUNT: usize = 4;

struct GroupState {
    /// Next offset to deliver, per partition. Everything below is acked.
    committed: Vec<u64>,
    /// Live senders, per partition. Replaced on resubscribe.
    senders: Vec<mpsc::UnboundedSender<Delivery>>,
}

struct TopicState {
    /// Retained log per partition; the offset is the index.
    partitions: Vec<Vec<EventEnvelope>>,
    groups: HashMap<String, GroupState>,
}

impl TopicState {
    fn new(partition_count: usize) -> Self {
        Self {
            partitions: vec![Vec::new(); partition_count],
            groups: HashMap::new(),
        }
    }
}

/// In-memory implementation of `BrokerPort`.
///
/// Suitable for testing and development. Not for production use.
pub struct InMemoryBroker {
    partition_count: usize,
    topics: Mutex<HashMap<Topic, TopicState>>,
}

impl InMemoryBroker {
    /// Create a broker with the given number of partitions per topic.
    #[must_use]
    pub fn new(partition_count: usize) -> Self {
        Self {
            partition_count: partition_count.max(1),
            topics: Mutex::new(HashMap::new()),
        }
    }

    /// Partition an envelope key lands on. Stable for the broker's lifetime.
    #[must_use]
    pub fn partition_for(&self, partition_key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        partition_key.hash(&mut hasher);
        #[allow(clippy::cast_possible_truncation)]
        let partition = (hasher.finish() % self.partition_count as u64) as usize;
        partition
    }

    /// Number of retained envelopes on a topic, across all partitions.
    #[must_use]
    pub fn log_len(&self, topic: Topic) -> usize {
        let topics = self.topics.lock().unwrap();
        topics
            .get(&topic)
            .map_or(0, |t| t.partitions.iter().map(Vec::len).sum())
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new(DEFAULT_PARTITION_COUNT)
    }
}

#[async_trait]
impl BrokerPort for InMemoryBroker {
    async fn publish(
        &self,
        topic: Topic,
        partition_key: &str,
        envelope: EventEnvelope,
    ) -> Result<(), BrokerError> {
        let partition = self.partition_for(partition_key);
        let mut topics = self.topics.lock().unwrap();
        let state = topics
            .entry(topic)
            .or_insert_with(|| TopicState::new(self.partition_count));

        let log = &mut state.partitions[partition];
        let offset = log.len() as u64;
        log.push(envelope.clone());

        for group in state.groups.values() {
            // A closed receiver just means the group is between
            // subscriptions; the log keeps the envelope for replay.
            let _ = group.senders[partition].send(Delivery {
                partition,
                offset,
                envelope: envelope.clone(),
            });
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: Topic,
        consumer_group: &str,
    ) -> Result<Subscription, BrokerError> {
        let mut topics = self.topics.lock().unwrap();
        let state = topics
            .entry(topic)
            .or_insert_with(|| TopicState::new(self.partition_count));

        let mut senders = Vec::with_capacity(self.partition_count);
        let mut receivers = Vec::with_capacity(self.partition_count);
        for _ in 0..self.partition_count {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(tx);
            receivers.push(rx);
        }

        let committed = state
            .groups
            .get(consumer_group)
            .map_or_else(|| vec![0; self.partition_count], |g| g.committed.clone());

        // Replay everything at or past the committed offset before new
        // publishes start flowing to the fresh senders.
        for (partition, log) in state.partitions.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            for (offset, envelope) in log.iter().enumerate().skip(committed[partition] as usize) {
                let _ = senders[partition].send(Delivery {
                    partition,
                    offset: offset as u64,
                    envelope: envelope.clone(),
                });
            }
        }

        state.groups.insert(
            consumer_group.to_string(),
            GroupState { committed, senders },
        );

        Ok(Subscription {
            topic,
            consumer_group: consumer_group.to_string(),
            partitions: receivers,
        })
    }

    async fn ack(
        &self,
        topic: Topic,
        consumer_group: &str,
        partition: usize,
        offset: u64,
    ) -> Result<(), BrokerError> {
        let mut topics = self.topics.lock().unwrap();
        let group = topics
            .get_mut(&topic)
            .and_then(|t| t.groups.get_mut(consumer_group))
            .ok_or_else(|| BrokerError::UnknownSubscription {
                message: format!("group {consumer_group} is not subscribed to {topic}"),
            })?;
        let committed =
            group
                .committed
                .get_mut(partition)
                .ok_or_else(|| BrokerError::UnknownSubscription {
                    message: format!("partition {partition} out of range for {topic}"),
                })?;
        *committed = (*committed).max(offset + 1);
        Ok(())
    }
}
