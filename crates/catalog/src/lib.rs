//! Product catalog and configuration lookup tables.
//!
//! Pure data: records as they live in the document store, plus the immutable
//! [`CatalogSnapshot`] the projection and write paths consume. No IO here.

pub mod conversion;
pub mod lookup;
pub mod product;
pub mod snapshot;
pub mod supplier;

pub use conversion::ConversionRule;
pub use lookup::{Addressing, EntryType, ExitType, Group, Location, Work};
pub use product::Product;
pub use snapshot::CatalogSnapshot;
pub use supplier::Supplier;
