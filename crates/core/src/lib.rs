//! `stockroom-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod numeric;

pub use error::{DomainError, DomainResult};
pub use id::{
    AddressingId, ConversionRuleId, EntryTypeId, ExitTypeId, GroupId, LocationId, MovementId,
    ProductId, SupplierId, WorkId,
};
pub use numeric::{LenientQuantity, parse_lenient_decimal};
