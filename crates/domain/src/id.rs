//! Identifiers of the records a farm keeps.
//!
//! Rows and hutches are identified by name; everything else carries a random
//! UUID wrapped in its own type so ids of different records never mix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! uuid_id {
    ($(#[doc = $doc:expr])* $name:ident, $kind:literal) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Record kind named in parse errors.
            pub const KIND: &'static str = $kind;

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ValidationError::MalformedId {
                        kind: Self::KIND,
                        value: s.to_string(),
                    })
            }
        }
    };
}

uuid_id!(
    /// A farm. Every row, hutch and rabbit is scoped to one.
    FarmId,
    "farm"
);

uuid_id!(
    /// Internal id of a [`Rabbit`](crate::rabbit::Rabbit), distinct from its ear tag.
    RabbitId,
    "rabbit"
);

uuid_id!(
    /// A [`BreedingRecord`](crate::breeding::BreedingRecord).
    BreedingRecordId,
    "breeding record"
);

uuid_id!(KitId, "kit");

uuid_id!(
    /// An entry of a hutch's [removal history](crate::removal::HutchRemovalRecord).
    RemovalRecordId,
    "removal record"
);
