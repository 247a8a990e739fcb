//! Strongly-typed identifiers used across the domain.
//!
//! Every document collection gets its own newtype so a movement's product
//! reference can never silently stand in for, say, a supplier id.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! impl_uuid_newtype {
    ($t:ident, $name:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

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

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
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

impl_uuid_newtype!(ProductId, "ProductId", "Identifier of a catalog product.");
impl_uuid_newtype!(MovementId, "MovementId", "Identifier of a ledger movement.");
impl_uuid_newtype!(SupplierId, "SupplierId", "Identifier of a supplier.");
impl_uuid_newtype!(GroupId, "GroupId", "Identifier of a product group.");
impl_uuid_newtype!(
    ConversionRuleId,
    "ConversionRuleId",
    "Identifier of a purchase-unit conversion rule."
);
impl_uuid_newtype!(
    AddressingId,
    "AddressingId",
    "Identifier of a shelf/bin addressing entry."
);
impl_uuid_newtype!(LocationId, "LocationId", "Identifier of a storage location.");
impl_uuid_newtype!(EntryTypeId, "EntryTypeId", "Identifier of an entry type.");
impl_uuid_newtype!(ExitTypeId, "ExitTypeId", "Identifier of an exit type.");
impl_uuid_newtype!(WorkId, "WorkId", "Identifier of a work/job site.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_well_formed_ids() {
        let id = ProductId::new();
        let parsed: ProductId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        // Incidental whitespace is not forgiven here; resolution stays exact.
        let padded = format!(" {id} ");
        assert!(padded.parse::<ProductId>().is_err());
        assert!("18195-000".parse::<ProductId>().is_err());
    }
}
