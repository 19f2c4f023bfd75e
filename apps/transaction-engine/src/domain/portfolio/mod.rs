//! Portfolio Bounded Context
//!
//! The projection target for completed transactions: cash, holdings with
//! derived valuation fields, and the persistence port.

pub mod aggregate;
pub mod errors;
pub mod holding;
pub mod repository;

pub use aggregate::{Portfolio, PortfolioStatus};
pub use errors::PortfolioError;
pub use holding::Holding;
pub use repository::PortfolioRepository;
