//! Transaction State Machine Service
//!
//! Validates lifecycle transitions. This is the only place that knows the
//! full transition table; the aggregate delegates every status change here.

use crate::domain::transaction::errors::TransactionError;
use crate::domain::transaction::value_objects::TransactionStatus;

/// Transaction state machine for validating transitions.
pub struct TransactionStateMachine;

impl TransactionStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: TransactionStatus, to: TransactionStatus) -> bool {
        matches!(
            (from, to),
            // From Pending
            (TransactionStatus::Pending, TransactionStatus::Processing)
                | (TransactionStatus::Pending, TransactionStatus::Cancelled)
                // From Processing
                | (TransactionStatus::Processing, TransactionStatus::Completed)
                | (TransactionStatus::Processing, TransactionStatus::Failed)
                | (TransactionStatus::Processing, TransactionStatus::Cancelled)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Result<(), TransactionError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(TransactionError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: TransactionStatus, to: TransactionStatus) -> String {
        match from {
            TransactionStatus::Completed => {
                format!("Transaction is already completed, cannot transition to {to}")
            }
            TransactionStatus::Failed => {
                format!("Transaction has failed, cannot transition to {to}")
            }
            TransactionStatus::Cancelled => {
                format!("Transaction is cancelled, cannot transition to {to}")
            }
            _ => format!("Invalid transition from {from} to {to}"),
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: TransactionStatus) -> Vec<TransactionStatus> {
        match from {
            TransactionStatus::Pending => vec![
                TransactionStatus::Processing,
                TransactionStatus::Cancelled,
            ],
            TransactionStatus::Processing => vec![
                TransactionStatus::Completed,
                TransactionStatus::Failed,
                TransactionStatus::Cancelled,
            ],
            // Terminal states
            TransactionStatus::Completed
            | TransactionStatus::Failed
            | TransactionStatus::Cancelled => vec![],
        }
    }
}
