//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up IDs from different contexts.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(TransactionId, "Unique identifier for a transaction.");
define_id!(PortfolioId, "Unique identifier for a portfolio.");
define_id!(
    EventId,
    "Unique identifier for a published event envelope. Generated at publish time."
);
define_id!(ClientId, "Unique identifier for a client.");
define_id!(AccountNumber, "Account number referenced by transactions and portfolios.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_id_new_and_display() {
        let id = TransactionId::new("txn-123");
        assert_eq!(id.as_str(), "txn-123");
        assert_eq!(format!("{id}"), "txn-123");
    }

    #[test]
    fn transaction_id_generate_is_unique() {
        let id1 = TransactionId::generate();
        let id2 = TransactionId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn event_id_equality() {
        let id1 = EventId::new("evt-1");
        let id2 = EventId::new("evt-1");
        let id3 = EventId::new("evt-2");
        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn id_serde_is_transparent() {
        let id = PortfolioId::new("pf-9");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"pf-9\"");
    }
}
