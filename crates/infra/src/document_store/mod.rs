//! Document-store abstractions over the remote collections.

pub mod in_memory;
mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{CasOutcome, DocumentStore, LedgerMaintenance, StoreError};
