//! Value objects for the transaction lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction lifecycle status.
///
/// Valid edges are owned by [`super::TransactionStateMachine`]:
/// PENDING -> PROCESSING -> {COMPLETED | FAILED}, and
/// PENDING | PROCESSING -> CANCELLED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Created and validated, awaiting processing.
    Pending,
    /// Settlement in progress.
    Processing,
    /// Settled successfully. Terminal.
    Completed,
    /// Settlement failed or timed out. Terminal.
    Failed,
    /// Cancelled before settlement finished. Terminal.
    Cancelled,
}

impl TransactionStatus {
    /// Whether this status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Wire representation (SCREAMING_SNAKE_CASE).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Purchase of an instrument.
    Buy,
    /// Sale of an instrument.
    Sell,
    /// Dividend credited to cash.
    Dividend,
    /// Cash deposit.
    Deposit,
    /// Cash withdrawal.
    Withdrawal,
}

impl TransactionType {
    /// Whether a completed transaction of this kind changes a holding.
    #[must_use]
    pub const fn affects_holdings(&self) -> bool {
        matches!(self, Self::Buy | Self::Sell)
    }

    /// Wire representation (SCREAMING_SNAKE_CASE).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Dividend => "DIVIDEND",
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(!TransactionStatus::Processing.is_terminal());
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
        assert!(TransactionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn status_serde_screaming_snake() {
        let json = serde_json::to_string(&TransactionStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");
        let back: TransactionStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(back, TransactionStatus::Cancelled);
    }

    #[test]
    fn type_serde_screaming_snake() {
        let json = serde_json::to_string(&TransactionType::Withdrawal).unwrap();
        assert_eq!(json, "\"WITHDRAWAL\"");
    }

    #[test]
    fn holdings_impact_by_type() {
        assert!(TransactionType::Buy.affects_holdings());
        assert!(TransactionType::Sell.affects_holdings());
        assert!(!TransactionType::Deposit.affects_holdings());
        assert!(!TransactionType::Dividend.affects_holdings());
    }
}
