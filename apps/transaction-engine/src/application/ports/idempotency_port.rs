//! Idempotency Ledger Port (Driven Port)
//!
//! Per-consumer record of already-processed event identifiers, used to
//! collapse duplicate deliveries. Entries may expire after a retention
//! window at least as long as the broker's maximum redelivery window; the
//! ledger is not a permanent audit.

use async_trait::async_trait;

use crate::domain::shared::EventId;

/// Ledger storage error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    /// Backing store failure.
    #[error("Idempotency ledger storage error: {message}")]
    Storage {
        /// Error description.
        message: String,
    },
}

/// Port for the idempotency ledger.
#[async_trait]
pub trait IdempotencyLedger: Send + Sync {
    /// Whether this consumer has already processed the event.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store fails.
    async fn seen(&self, consumer: &str, event_id: &EventId) -> Result<bool, LedgerError>;

    /// Record the event as processed by this consumer.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store fails.
    async fn mark_seen(&self, consumer: &str, event_id: &EventId) -> Result<(), LedgerError>;
}
