//! Application Services
//!
//! Use-case orchestration over the domain: the lifecycle service driving
//! the state machine, the background event publisher, and the cached
//! portfolio read side.

mod event_publisher;
mod portfolio_view;
mod transaction_service;

pub use event_publisher::EventPublisher;
pub use portfolio_view::{PortfolioViewService, portfolio_cache_key};
pub use transaction_service::TransactionService;
