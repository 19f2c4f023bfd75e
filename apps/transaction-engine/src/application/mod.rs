//! Application Layer
//!
//! Use cases, ports, and event plumbing. Depends on the domain layer and
//! defines the interfaces the infrastructure layer implements.

pub mod consumers;
pub mod events;
pub mod ports;
pub mod services;
