//! Infrastructure Layer
//!
//! Adapters implementing the application's driven ports. Everything here
//! is in-memory: the engine's outer surfaces are substituted at the port
//! seams, not behind network clients.

pub mod broker;
pub mod cache;
pub mod idempotency;
pub mod notification;
pub mod persistence;
