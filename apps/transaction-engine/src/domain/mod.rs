//! Domain layer - Core business logic with no external dependencies.

pub mod portfolio;
pub mod shared;
pub mod transaction;
