//! Transaction lifecycle errors.

use std::fmt;

use super::value_objects::TransactionStatus;

/// Errors that can occur in the transaction lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// Invalid input to create. Rejected before any state change.
    Validation {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current transaction status.
        from: TransactionStatus,
        /// Attempted status.
        to: TransactionStatus,
        /// Reason for failure.
        reason: String,
    },

    /// Transaction cannot be cancelled in current state.
    CannotCancel {
        /// Current status.
        status: TransactionStatus,
    },

    /// Transaction not found.
    NotFound {
        /// Transaction ID.
        transaction_id: String,
    },

    /// Persistence failure.
    Repository {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { field, message } => {
                write!(f, "Validation failed for '{field}': {message}")
            }
            Self::InvalidStateTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid transaction state transition: {from} -> {to}: {reason}"
                )
            }
            Self::CannotCancel { status } => {
                write!(f, "Cannot cancel transaction in status: {status}")
            }
            Self::NotFound { transaction_id } => {
                write!(f, "Transaction not found: {transaction_id}")
            }
            Self::Repository { message } => {
                write!(f, "Transaction repository error: {message}")
            }
        }
    }
}

impl std::error::Error for TransactionError {}
