// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Transaction Engine - Rust Core Library
//!
//! Event-driven transaction lifecycle and portfolio projection engine.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, domain events)
//!   - `transaction`: Transaction aggregate, status state machine, transition events
//!   - `portfolio`: Portfolio projection aggregate, holdings, cash movements
//!   - `shared`: Identifiers, money, quantity, symbol, timestamp
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`BrokerPort`, `CachePort`,
//!     `IdempotencyLedger`, `SettlementGateway`, `NotificationSink`)
//!   - `services`: `TransactionService`, `EventPublisher`, `PortfolioViewService`
//!   - `consumers`: `ProjectionUpdater`, `NotificationConsumer`
//!   - `events`: Event envelope wire format and topics
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `broker`: Partitioned in-memory broker with at-least-once delivery
//!   - `persistence`: In-memory repositories
//!   - `cache`, `idempotency`, `notification`: In-memory port adapters

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases, consumers and port definitions.
pub mod application;

/// Infrastructure layer - Adapters implementing the ports.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Resilience patterns (retry with exponential backoff).
pub mod resilience;

/// Tracing setup.
pub mod telemetry;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::portfolio::{Portfolio, PortfolioError};
pub use domain::transaction::{
    CreateTransactionCommand, Transaction, TransactionError, TransactionStatus, TransactionType,
};

// Application re-exports
pub use application::events::{EventEnvelope, EventType, Topic};
pub use application::services::TransactionService;
