//! Event Envelope: the wire format for all asynchronous notifications.
//!
//! The JSON shape is the only bit-exact contract this engine exposes:
//! camelCase fields, decimal values as strings, enum values as
//! SCREAMING_SNAKE_CASE strings, ISO-8601 timestamp. Envelopes are created
//! once at publish time and immutable thereafter; the broker may re-deliver
//! them but never update them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{
    AccountNumber, EventId, PortfolioId, Symbol, Timestamp, TransactionId,
};
use crate::domain::transaction::{TransactionEvent, TransactionStatus, TransactionType};

/// Logical topics events are published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    /// Transaction lifecycle events.
    TransactionEvents,
    /// Portfolio-originated events.
    PortfolioEvents,
}

impl Topic {
    /// Topic name on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionEvents => "transaction-events",
            Self::PortfolioEvents => "portfolio-events",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event type, one per state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Transaction created and validated.
    TransactionCreated,
    /// Settlement started.
    TransactionProcessing,
    /// Settlement succeeded.
    TransactionCompleted,
    /// Settlement failed.
    TransactionFailed,
    /// Transaction cancelled.
    TransactionCancelled,
}

impl EventType {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionCreated => "TRANSACTION_CREATED",
            Self::TransactionProcessing => "TRANSACTION_PROCESSING",
            Self::TransactionCompleted => "TRANSACTION_COMPLETED",
            Self::TransactionFailed => "TRANSACTION_FAILED",
            Self::TransactionCancelled => "TRANSACTION_CANCELLED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable record announcing one state transition, carrying enough data
/// for a consumer to act without re-querying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Unique event ID, generated at publish time. Dedup key for consumers.
    pub event_id: EventId,
    /// Event type.
    pub event_type: EventType,
    /// Transaction the event belongs to. Also the partition key.
    pub transaction_id: TransactionId,
    /// Referenced portfolio.
    pub portfolio_id: PortfolioId,
    /// Referenced account.
    pub account_number: AccountNumber,
    /// Transaction kind.
    pub transaction_type: TransactionType,
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Quantity, as a decimal string on the wire.
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    /// Unit price, as a decimal string on the wire.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// Total amount (gross + commission), as a decimal string on the wire.
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount: Decimal,
    /// Transaction status after the transition.
    pub status: TransactionStatus,
    /// Emission timestamp, ISO-8601.
    pub timestamp: Timestamp,
}

impl EventEnvelope {
    /// Build an envelope from a domain transition event.
    ///
    /// Generates the event ID; this is the moment the envelope's identity
    /// comes into existence.
    #[must_use]
    pub fn from_transition(event: &TransactionEvent) -> Self {
        let event_type = match event {
            TransactionEvent::Created(_) => EventType::TransactionCreated,
            TransactionEvent::Processing(_) => EventType::TransactionProcessing,
            TransactionEvent::Completed(_) => EventType::TransactionCompleted,
            TransactionEvent::Failed(_) => EventType::TransactionFailed,
            TransactionEvent::Cancelled(_) => EventType::TransactionCancelled,
        };
        let snapshot = event.snapshot();
        Self {
            event_id: EventId::generate(),
            event_type,
            transaction_id: snapshot.transaction_id.clone(),
            portfolio_id: snapshot.portfolio_id.clone(),
            account_number: snapshot.account_number.clone(),
            transaction_type: snapshot.transaction_type,
            symbol: snapshot.symbol.clone(),
            quantity: snapshot.quantity.amount(),
            price: snapshot.price.amount(),
            total_amount: snapshot.total_amount.amount(),
            status: snapshot.status,
            timestamp: snapshot.occurred_at,
        }
    }

    /// The routing/partition key: the transaction ID, so that all events for
    /// one transaction reach the same partition in order.
    #[must_use]
    pub fn partition_key(&self) -> &str {
        self.transaction_id.as_str()
    }

    /// The topic this envelope is published to.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        Topic::TransactionEvents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::{Money, Quantity};
    use crate::domain::transaction::TransitionSnapshot;
    use rust_decimal_macros::dec;

    fn completed_event() -> TransactionEvent {
        TransactionEvent::Completed(TransitionSnapshot {
            transaction_id: TransactionId::new("txn-1"),
            portfolio_id: PortfolioId::new("pf-1"),
            account_number: AccountNumber::new("ACC-001"),
            transaction_type: TransactionType::Buy,
            symbol: Symbol::new("AAPL"),
            quantity: Quantity::from_i64(100),
            price: Money::new(dec!(150)),
            total_amount: Money::new(dec!(15009.99)),
            status: TransactionStatus::Completed,
            occurred_at: Timestamp::parse("2026-03-01T12:30:00Z").unwrap(),
        })
    }

    #[test]
    fn wire_schema_field_names_and_string_decimals() {
        let envelope = EventEnvelope::from_transition(&completed_event());
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["eventType"], "TRANSACTION_COMPLETED");
        assert_eq!(json["transactionId"], "txn-1");
        assert_eq!(json["portfolioId"], "pf-1");
        assert_eq!(json["accountNumber"], "ACC-001");
        assert_eq!(json["transactionType"], "BUY");
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["quantity"], "100");
        assert_eq!(json["price"], "150");
        assert_eq!(json["totalAmount"], "15009.99");
        assert_eq!(json["status"], "COMPLETED");
        assert!(json["timestamp"].as_str().unwrap().starts_with("2026-03-01T12:30:00"));
        assert!(json["eventId"].is_string());
    }

    #[test]
    fn envelope_round_trips_through_json() {
        let envelope = EventEnvelope::from_transition(&completed_event());
        let json = serde_json::to_string(&envelope).unwrap();
        let back: EventEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(envelope, back);
    }

    #[test]
    fn each_publish_gets_a_fresh_event_id() {
        let event = completed_event();
        let a = EventEnvelope::from_transition(&event);
        let b = EventEnvelope::from_transition(&event);
        assert_ne!(a.event_id, b.event_id);
    }

    #[test]
    fn partition_key_is_transaction_id() {
        let envelope = EventEnvelope::from_transition(&completed_event());
        assert_eq!(envelope.partition_key(), "txn-1");
        assert_eq!(envelope.topic(), Topic::TransactionEvents);
    }

    #[test]
    fn topic_names() {
        assert_eq!(Topic::TransactionEvents.as_str(), "transaction-events");
        assert_eq!(Topic::PortfolioEvents.as_str(), "portfolio-events");
    }
}
