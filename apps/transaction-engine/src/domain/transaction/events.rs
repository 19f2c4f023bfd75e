//! Domain events for the transaction lifecycle.
//!
//! One event per state transition. Each event carries a snapshot of the
//! fields a consumer needs to act without re-querying the transaction.

use serde::{Deserialize, Serialize};

use super::value_objects::{TransactionStatus, TransactionType};
use crate::domain::shared::{
    AccountNumber, Money, PortfolioId, Quantity, Symbol, Timestamp, TransactionId,
};

/// Snapshot of a transaction at the moment of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSnapshot {
    /// Transaction ID.
    pub transaction_id: TransactionId,
    /// Referenced portfolio.
    pub portfolio_id: PortfolioId,
    /// Referenced account.
    pub account_number: AccountNumber,
    /// Transaction kind.
    pub transaction_type: TransactionType,
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Quantity.
    pub quantity: Quantity,
    /// Unit price.
    pub price: Money,
    /// Total amount (gross + commission).
    pub total_amount: Money,
    /// Status after the transition.
    pub status: TransactionStatus,
    /// When the transition occurred.
    pub occurred_at: Timestamp,
}

/// All possible transaction lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionEvent {
    /// Transaction created and validated.
    Created(TransitionSnapshot),
    /// Settlement started.
    Processing(TransitionSnapshot),
    /// Settlement succeeded. Terminal.
    Completed(TransitionSnapshot),
    /// Settlement failed. Terminal.
    Failed(TransitionSnapshot),
    /// Cancelled before settlement finished. Terminal.
    Cancelled(TransitionSnapshot),
}

impl TransactionEvent {
    /// Get the snapshot carried by this event.
    #[must_use]
    pub const fn snapshot(&self) -> &TransitionSnapshot {
        match self {
            Self::Created(s)
            | Self::Processing(s)
            | Self::Completed(s)
            | Self::Failed(s)
            | Self::Cancelled(s) => s,
        }
    }

    /// Get the transaction ID for this event.
    #[must_use]
    pub const fn transaction_id(&self) -> &TransactionId {
        &self.snapshot().transaction_id
    }

    /// Get the timestamp when this event occurred.
    #[must_use]
    pub const fn occurred_at(&self) -> Timestamp {
        self.snapshot().occurred_at
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Created(_) => "TRANSACTION_CREATED",
            Self::Processing(_) => "TRANSACTION_PROCESSING",
            Self::Completed(_) => "TRANSACTION_COMPLETED",
            Self::Failed(_) => "TRANSACTION_FAILED",
            Self::Cancelled(_) => "TRANSACTION_CANCELLED",
        }
    }
}
