//! Infrastructure layer: document-store adapters, transactional write paths,
//! balance reconciliation, and the one-time reference migration.

pub mod document_store;
pub mod migration;
pub mod reconciler;
pub mod service;

pub use document_store::{
    CasOutcome, DocumentStore, InMemoryDocumentStore, LedgerMaintenance, StoreError,
};
pub use migration::{RefMigrationReport, migrate_product_refs};
pub use reconciler::{ReconcileSummary, Reconciler};
pub use service::{ServiceError, StockService};
