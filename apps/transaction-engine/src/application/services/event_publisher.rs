//! Event Publisher
//!
//! Turns state transitions into Event Envelopes and hands them to the
//! broker, keyed by transaction id so that all events for one transaction
//! reach the same partition in order.
//!
//! A single dispatcher task drains an unbounded queue and publishes
//! sequentially. Enqueueing is synchronous and infallible, so the state
//! machine is never blocked by a slow or unreachable broker. Sequential
//! dispatch preserves per-transaction publish order; broker failures are
//! retried with bounded exponential backoff, and envelopes that exhaust
//! their retries are logged in full for manual replay, never silently
//! dropped and never rolled back.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::events::EventEnvelope;
use crate::application::ports::{BrokerPort, TransitionPublisher};
use crate::domain::transaction::TransactionEvent;
use crate::resilience::{ExponentialBackoff, RetryPolicy};

/// Publisher that dispatches envelopes to the broker in the background.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    queue: mpsc::UnboundedSender<EventEnvelope>,
}

impl EventPublisher {
    /// Start the dispatcher task and return a handle for enqueueing.
    ///
    /// The task runs until every handle is dropped and the queue drains.
    #[must_use]
    pub fn spawn<B>(broker: Arc<B>, policy: RetryPolicy) -> Self
    where
        B: BrokerPort + 'static,
    {
        let (queue, mut receiver) = mpsc::unbounded_channel::<EventEnvelope>();
        tokio::spawn(async move {
            while let Some(envelope) = receiver.recv().await {
                publish_with_retry(broker.as_ref(), &policy, envelope).await;
            }
        });
        Self { queue }
    }
}

impl TransitionPublisher for EventPublisher {
    fn publish_events(&self, events: Vec<TransactionEvent>) {
        for event in events {
            let envelope = EventEnvelope::from_transition(&event);
            if let Err(e) = self.queue.send(envelope) {
                // Dispatcher is gone; keep the envelope recoverable.
                tracing::error!(
                    envelope = %serialize_for_replay(&e.0),
                    "event dispatcher stopped, envelope logged for manual replay"
                );
            }
        }
    }
}

async fn publish_with_retry(broker: &dyn BrokerPort, policy: &RetryPolicy, envelope: EventEnvelope) {
    let topic = envelope.topic();
    let mut backoff = ExponentialBackoff::new(policy);

    loop {
        match broker
            .publish(topic, envelope.partition_key(), envelope.clone())
            .await
        {
            Ok(()) => {
                tracing::debug!(
                    event_id = %envelope.event_id,
                    event_type = %envelope.event_type,
                    transaction_id = %envelope.transaction_id,
                    "published event"
                );
                return;
            }
            Err(e) => match backoff.next_backoff() {
                Some(delay) => {
                    tracing::warn!(
                        event_id = %envelope.event_id,
                        attempt = backoff.current_attempt(),
                        error = %e,
                        "publish failed, retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::error!(
                        event_id = %envelope.event_id,
                        error = %e,
                        envelope = %serialize_for_replay(&envelope),
                        "publish retries exhausted, envelope logged for manual replay"
                    );
                    return;
                }
            },
        }
    }
}

fn serialize_for_replay(envelope: &EventEnvelope) -> String {
    serde_json::to_string(envelope)
        .unwrap_or_else(|_| format!("{envelope:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::Topic;
    use crate::application::ports::{BrokerError, Subscription};
    use crate::domain::shared::{
        AccountNumber, Money, PortfolioId, Quantity, Symbol, Timestamp, TransactionId,
    };
    use crate::domain::transaction::{TransactionStatus, TransactionType, TransitionSnapshot};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Broker stub that fails the first `failures` publishes.
    struct FlakyBroker {
        failures: AtomicU32,
        published: Mutex<Vec<EventEnvelope>>,
    }

    impl FlakyBroker {
        fn new(failures: u32) -> Self {
            Self {
                failures: AtomicU32::new(failures),
                published: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BrokerPort for FlakyBroker {
        async fn publish(
            &self,
            _topic: Topic,
            _partition_key: &str,
            envelope: EventEnvelope,
        ) -> Result<(), BrokerError> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(BrokerError::Unavailable {
                    message: "connection refused".to_string(),
                });
            }
            self.published.lock().unwrap().push(envelope);
            Ok(())
        }

        async fn subscribe(
            &self,
            _topic: Topic,
            _consumer_group: &str,
        ) -> Result<Subscription, BrokerError> {
            unimplemented!("not used by these tests")
        }

        async fn ack(
            &self,
            _topic: Topic,
            _consumer_group: &str,
            _partition: usize,
            _offset: u64,
        ) -> Result<(), BrokerError> {
            Ok(())
        }
    }

    fn created_event(txn: &str) -> TransactionEvent {
        TransactionEvent::Created(TransitionSnapshot {
            transaction_id: TransactionId::new(txn),
            portfolio_id: PortfolioId::new("pf-1"),
            account_number: AccountNumber::new("ACC-001"),
            transaction_type: TransactionType::Buy,
            symbol: Symbol::new("AAPL"),
            quantity: Quantity::from_i64(100),
            price: Money::new(dec!(150)),
            total_amount: Money::new(dec!(15000)),
            status: TransactionStatus::Pending,
            occurred_at: Timestamp::now(),
        })
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }

    async fn wait_for_published(broker: &FlakyBroker, count: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if broker.published.lock().unwrap().len() >= count {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("publisher did not deliver in time");
    }

    #[tokio::test]
    async fn publishes_events_in_order() {
        let broker = Arc::new(FlakyBroker::new(0));
        let publisher = EventPublisher::spawn(Arc::clone(&broker), fast_policy(3));

        publisher.publish_event(created_event("txn-1"));
        publisher.publish_event(created_event("txn-2"));

        wait_for_published(&broker, 2).await;
        let published = broker.published.lock().unwrap();
        assert_eq!(published[0].transaction_id.as_str(), "txn-1");
        assert_eq!(published[1].transaction_id.as_str(), "txn-2");
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let broker = Arc::new(FlakyBroker::new(2));
        let publisher = EventPublisher::spawn(Arc::clone(&broker), fast_policy(5));

        publisher.publish_event(created_event("txn-1"));

        wait_for_published(&broker, 1).await;
        assert_eq!(broker.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_do_not_wedge_the_dispatcher() {
        // First envelope exhausts its 3 attempts (1 + 2 retries) against
        // exactly 3 failures; the second must still go out.
        let broker = Arc::new(FlakyBroker::new(3));
        let publisher = EventPublisher::spawn(Arc::clone(&broker), fast_policy(2));

        publisher.publish_event(created_event("txn-dropped"));
        publisher.publish_event(created_event("txn-2"));

        wait_for_published(&broker, 1).await;
        let published = broker.published.lock().unwrap();
        assert_eq!(published[0].transaction_id.as_str(), "txn-2");
    }
}
