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
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(RunId, "Unique identifier for one screening run.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_new_and_display() {
        let id = RunId::new("run-1");
        assert_eq!(id.as_str(), "run-1");
        assert_eq!(format!("{id}"), "run-1");
    }

    #[test]
    fn run_id_generate_is_unique() {
        assert_ne!(RunId::generate(), RunId::generate());
    }

    #[test]
    fn run_id_serializes_transparently() {
        let id = RunId::from("run-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"run-7\"");
    }
}
