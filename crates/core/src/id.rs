//! Strongly-typed identifiers used across the configurator.
//!
//! Catalog identifiers (`ModelId`, `StepId`, `OptionId`) are short strings taken
//! from the product data. Session and saved-list identifiers are UUIDv7.

use core::borrow::Borrow;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a product model (e.g. `SS2`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

/// Identifier of a configuration step, unique within a model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

/// Identifier of an option, unique within its step only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
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

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $t {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $t {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $t {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        /// Parsing rejects blank input; use `From<&str>` for trusted catalog data.
        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_string_newtype!(ModelId, "ModelId");
impl_string_newtype!(StepId, "StepId");
impl_string_newtype!(OptionId, "OptionId");

/// Identifier of a configuration session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

/// Identifier of a saved ("my list") configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedConfigurationId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_newtype!(SessionId, "SessionId");
impl_uuid_newtype!(SavedConfigurationId, "SavedConfigurationId");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn string_ids_borrow_as_str_for_map_lookups() {
        let mut map = BTreeMap::new();
        map.insert(StepId::from("colour"), 1);

        assert_eq!(map.get("colour"), Some(&1));
        assert_eq!(map.get("cover"), None);
    }

    #[test]
    fn parsing_rejects_blank_ids() {
        assert!(matches!("  ".parse::<OptionId>(), Err(DomainError::InvalidId(_))));
        assert_eq!(" EN ".parse::<OptionId>().unwrap(), OptionId::from("EN"));
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = ModelId::from("SS2");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"SS2\"");

        let back: ModelId = serde_json::from_str("\"SS2\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn uuid_ids_round_trip_through_display() {
        let id = SavedConfigurationId::new();
        let parsed: SavedConfigurationId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        assert!(matches!(
            "not-a-uuid".parse::<SessionId>(),
            Err(DomainError::InvalidId(_))
        ));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: parsing trims surrounding whitespace and nothing else.
            #[test]
            fn parse_trims_and_preserves_content(
                id in "[A-Za-z0-9&-][A-Za-z0-9 &-]{0,12}[A-Za-z0-9&-]",
                pad in " {0,3}",
            ) {
                let parsed: StepId = format!("{pad}{id}{pad}").parse().unwrap();
                prop_assert_eq!(parsed.as_str(), id.as_str());
                prop_assert_eq!(parsed.to_string(), id);
            }
        }
    }
}
