//! Portfolio projection errors.

use std::fmt;

/// Errors that can occur when mutating a portfolio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortfolioError {
    /// Portfolio not found.
    NotFound {
        /// Portfolio ID.
        portfolio_id: String,
    },

    /// A SELL asks for more quantity than the portfolio holds.
    ///
    /// This indicates a logic or ordering bug upstream (the SELL should have
    /// been validated before completion), so it is reported, not retried.
    InsufficientHolding {
        /// Instrument symbol.
        symbol: String,
        /// Requested quantity.
        requested: String,
        /// Available quantity.
        available: String,
    },

    /// Persistence failure.
    Repository {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { portfolio_id } => {
                write!(f, "Portfolio not found: {portfolio_id}")
            }
            Self::InsufficientHolding {
                symbol,
                requested,
                available,
            } => {
                write!(
                    f,
                    "Insufficient holding of {symbol}: requested {requested}, available {available}"
                )
            }
            Self::Repository { message } => {
                write!(f, "Portfolio repository error: {message}")
            }
        }
    }
}

impl std::error::Error for PortfolioError {}
