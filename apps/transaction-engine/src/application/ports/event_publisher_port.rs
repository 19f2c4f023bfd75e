//! Event Publisher Port (Driven Port)
//!
//! Interface the state machine uses to announce transitions. Publishing is
//! fire-and-forget from the caller's perspective: the transaction record is
//! the source of truth and the event is a notification of that fact, so
//! enqueueing never blocks and never fails back into the caller. Delivery
//! faults are the publisher's problem (retry, then log for manual replay).

use crate::domain::transaction::TransactionEvent;

/// Port for publishing transaction transition events.
pub trait TransitionPublisher: Send + Sync {
    /// Hand a batch of transition events to the publisher, in order.
    fn publish_events(&self, events: Vec<TransactionEvent>);

    /// Hand a single transition event to the publisher.
    fn publish_event(&self, event: TransactionEvent) {
        self.publish_events(vec![event]);
    }
}

/// No-op publisher for tests that exercise the state machine alone.
#[derive(Debug, Clone, Default)]
pub struct NoOpTransitionPublisher;

impl TransitionPublisher for NoOpTransitionPublisher {
    fn publish_events(&self, _events: Vec<TransactionEvent>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::{AccountNumber, Money, PortfolioId, Quantity, Symbol, Timestamp, TransactionId};
    use crate::domain::transaction::{TransactionStatus, TransactionType, TransitionSnapshot};
    use rust_decimal_macros::dec;

    #[test]
    fn no_op_publisher_accepts_events() {
        let publisher = NoOpTransitionPublisher;
        publisher.publish_event(TransactionEvent::Created(TransitionSnapshot {
            transaction_id: TransactionId::new("txn-1"),
            portfolio_id: PortfolioId::new("pf-1"),
            account_number: AccountNumber::new("ACC-001"),
            transaction_type: TransactionType::Buy,
            symbol: Symbol::new("AAPL"),
            quantity: Quantity::from_i64(100),
            price: Money::new(dec!(150)),
            total_amount: Money::new(dec!(15000)),
            status: TransactionStatus::Pending,
            occurred_at: Timestamp::now(),
        }));
    }
}
