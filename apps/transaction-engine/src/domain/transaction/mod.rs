//! Transaction Bounded Context
//!
//! Owns the transaction lifecycle: the aggregate, the state machine that
//! validates transitions, the domain events emitted per transition, and the
//! persistence port.

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod repository;
pub mod state_machine;
pub mod value_objects;

pub use aggregate::{CreateTransactionCommand, Transaction};
pub use errors::TransactionError;
pub use events::{TransactionEvent, TransitionSnapshot};
pub use repository::TransactionRepository;
pub use state_machine::TransactionStateMachine;
pub use value_objects::{TransactionStatus, TransactionType};
