//! Strongly-typed identifiers used across the domain.
//!
//! Identifiers are opaque strings on the wire ("1", "2", ...), so the newtypes
//! wrap `String` rather than a UUID.

use serde::{Deserialize, Serialize};

/// Identifier of a user account (also the `sub` of an identity claim).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier of a property listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(String);

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Identifier minted from a store's monotonically increasing sequence.
            pub fn from_sequence(n: u64) -> Self {
                Self(n.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

impl_string_newtype!(UserId);
impl_string_newtype!(PropertyId);

/// Numeric part of a sequence-minted identifier, if it has one.
///
/// Used when seeding a store so freshly minted ids never collide with seeded
/// ones.
pub fn sequence_number(id: &str) -> Option<u64> {
    id.parse().ok()
}
