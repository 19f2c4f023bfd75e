//! Notification Consumer
//!
//! Renders a user-visible notification for every transaction lifecycle
//! event and hands it to the sink. Duplicate deliveries are collapsed
//! through the idempotency ledger so a user never receives the same
//! notification twice.

use std::sync::Arc;

use crate::application::events::{EventEnvelope, EventType, Topic};
use crate::application::ports::{
    BrokerError, BrokerPort, IdempotencyLedger, LedgerError, Notification, NotificationError,
    NotificationSink, Subscription,
};
use crate::domain::shared::Timestamp;

/// Consumer group name in the idempotency ledger and at the broker.
pub const CONSUMER_NAME: &str = "notifications";

/// Notification handling error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Sink rejected the notification.
    #[error(transparent)]
    Delivery(#[from] NotificationError),

    /// Idempotency ledger failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Consumes lifecycle events and delivers notifications.
pub struct NotificationConsumer<S, L>
where
    S: NotificationSink,
    L: IdempotencyLedger,
{
    sink: Arc<S>,
    ledger: Arc<L>,
}

impl<S, L> NotificationConsumer<S, L>
where
    S: NotificationSink + 'static,
    L: IdempotencyLedger + 'static,
{
    /// Create a new `NotificationConsumer`.
    #[must_use]
    pub const fn new(sink: Arc<S>, ledger: Arc<L>) -> Self {
        Self { sink, ledger }
    }

    /// Subscribe to the broker and spawn one consumer task per partition.
    ///
    /// Deliveries are acknowledged after the sink accepts them; a failed
    /// delivery stays unacknowledged and comes back on redelivery.
    ///
    /// # Errors
    ///
    /// Returns error if the subscription cannot be established.
    pub async fn spawn<B>(self: Arc<Self>, broker: Arc<B>) -> Result<(), BrokerError>
    where
        B: BrokerPort + 'static,
    {
        let Subscription {
            topic, partitions, ..
        } = broker
            .subscribe(Topic::TransactionEvents, CONSUMER_NAME)
            .await?;

        for (partition, mut receiver) in partitions.into_iter().enumerate() {
            let consumer = Arc::clone(&self);
            let broker = Arc::clone(&broker);
            tokio::spawn(async move {
                while let Some(delivery) = receiver.recv().await {
                    let offset = delivery.offset;
                    match consumer.handle_envelope(&delivery.envelope).await {
                        Ok(()) => {
                            if let Err(e) =
                                broker.ack(topic, CONSUMER_NAME, partition, offset).await
                            {
                                tracing::warn!(partition, offset, error = %e, "notification ack failed");
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                partition,
                                offset,
                                event_id = %delivery.envelope.event_id,
                                error = %e,
                                "notification failed, leaving delivery unacknowledged"
                            );
                        }
                    }
                }
            });
        }
        Ok(())
    }

    /// Render and deliver the notification for one envelope.
    ///
    /// Duplicates return `Ok` without a second delivery.
    ///
    /// # Errors
    ///
    /// Returns error if the sink or the ledger fails.
    pub async fn handle_envelope(&self, envelope: &EventEnvelope) -> Result<(), NotifyError> {
        if self.ledger.seen(CONSUMER_NAME, &envelope.event_id).await? {
            tracing::debug!(event_id = %envelope.event_id, "duplicate delivery, skipping");
            return Ok(());
        }

        let notification = render(envelope);
        self.sink.deliver(notification).await?;
        self.ledger.mark_seen(CONSUMER_NAME, &envelope.event_id).await?;
        tracing::debug!(
            event_id = %envelope.event_id,
            account_number = %envelope.account_number,
            "notification delivered"
        );
        Ok(())
    }
}

/// Render the user-visible text for an envelope.
fn render(envelope: &EventEnvelope) -> Notification {
    let subject = match envelope.event_type {
        EventType::TransactionCreated => format!(
            "{} order received for {}",
            envelope.transaction_type, envelope.symbol
        ),
        EventType::TransactionProcessing => format!(
            "{} order for {} is being processed",
            envelope.transaction_type, envelope.symbol
        ),
        EventType::TransactionCompleted => format!(
            "{} order for {} completed",
            envelope.transaction_type, envelope.symbol
        ),
        EventType::TransactionFailed => format!(
            "{} order for {} failed",
            envelope.transaction_type, envelope.symbol
        ),
        EventType::TransactionCancelled => format!(
            "{} order for {} cancelled",
            envelope.transaction_type, envelope.symbol
        ),
    };
    let body = format!(
        "Transaction {}: {} {} {} at {} (total {}), status {}.",
        envelope.transaction_id,
        envelope.transaction_type,
        envelope.quantity,
        envelope.symbol,
        envelope.price,
        envelope.total_amount,
        envelope.status,
    );
    Notification {
        account_number: envelope.account_number.clone(),
        subject,
        body,
        event_id: envelope.event_id.clone(),
        rendered_at: Timestamp::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::{
        AccountNumber, EventId, PortfolioId, Symbol, TransactionId,
    };
    use crate::domain::transaction::{TransactionStatus, TransactionType};
    use crate::infrastructure::idempotency::InMemoryIdempotencyLedger;
    use crate::infrastructure::notification::RecordingSink;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn consumer() -> (
        NotificationConsumer<RecordingSink, InMemoryIdempotencyLedger>,
        Arc<RecordingSink>,
    ) {
        let sink = Arc::new(RecordingSink::new());
        let ledger = Arc::new(InMemoryIdempotencyLedger::new(Duration::from_secs(3600)));
        (NotificationConsumer::new(Arc::clone(&sink), ledger), sink)
    }

    fn envelope(event_type: EventType) -> EventEnvelope {
        EventEnvelope {
            event_id: EventId::generate(),
            event_type,
            transaction_id: TransactionId::new("txn-1"),
            portfolio_id: PortfolioId::new("pf-1"),
            account_number: AccountNumber::new("ACC-001"),
            transaction_type: TransactionType::Buy,
            symbol: Symbol::new("AAPL"),
            quantity: dec!(100),
            price: dec!(150),
            total_amount: dec!(15009.99),
            status: TransactionStatus::Completed,
            timestamp: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn every_event_type_produces_a_notification() {
        let (consumer, sink) = consumer();
        for event_type in [
            EventType::TransactionCreated,
            EventType::TransactionProcessing,
            EventType::TransactionCompleted,
            EventType::TransactionFailed,
            EventType::TransactionCancelled,
        ] {
            consumer.handle_envelope(&envelope(event_type)).await.unwrap();
        }
        assert_eq!(sink.delivered().len(), 5);
    }

    #[tokio::test]
    async fn duplicate_delivery_notifies_once() {
        let (consumer, sink) = consumer();
        let e = envelope(EventType::TransactionCompleted);
        consumer.handle_envelope(&e).await.unwrap();
        consumer.handle_envelope(&e).await.unwrap();
        assert_eq!(sink.delivered().len(), 1);
    }

    #[tokio::test]
    async fn notification_carries_account_and_amounts() {
        let (consumer, sink) = consumer();
        consumer
            .handle_envelope(&envelope(EventType::TransactionCompleted))
            .await
            .unwrap();

        let delivered = sink.delivered();
        let n = &delivered[0];
        assert_eq!(n.account_number.as_str(), "ACC-001");
        assert!(n.subject.contains("AAPL"));
        assert!(n.body.contains("15009.99"));
    }
}
