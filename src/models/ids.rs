//! Typed identifiers for TimeLines and sequence nodes.
//!
//! Ids are plain strings because they double as cross-reference keys in
//! project files, and files written by other tools may use any string. Freshly
//! minted ids carry a kind prefix and a UUIDv4 suffix.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a [`TimeLine`](super::TimeLine).
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeLineId(String);

/// Identifier of a sequence node ([`TimeItem`](super::TimeItem) or
/// [`TimeBranch`](super::TimeBranch)).
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

macro_rules! impl_typed_id {
    ($T:ident, $prefix:literal) => {
        impl $T {
            /// Mint a new unique id.
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4().as_simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $T {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $T {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($T), self.0)
            }
        }
    };
}

impl_typed_id!(TimeLineId, "time-line");
impl_typed_id!(NodeId, "time-item");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_prefixed() {
        let a = TimeLineId::generate();
        let b = TimeLineId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("time-line-"));
        assert!(NodeId::generate().as_str().starts_with("time-item-"));
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = NodeId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
