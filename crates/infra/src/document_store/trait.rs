use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use stockroom_catalog::{CatalogSnapshot, Product};
use stockroom_core::{MovementId, ProductId};
use stockroom_ledger::{Movement, ProductRef};

/// Document store operation error.
///
/// Infrastructure failures only (storage, contention); domain failures
/// (validation, insufficient stock) never originate here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The balance guard failed: someone wrote between our read and our write.
    #[error("balance changed concurrently: {0}")]
    Contention(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("invalid write: {0}")]
    InvalidWrite(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Result of a compare-and-set on a product's cached balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CasOutcome {
    /// The stored value matched the expectation and was replaced.
    Updated,
    /// The stored value changed since it was read; nothing was written.
    Conflict { current: f64 },
}

/// The document-store contract the stock engine depends on.
///
/// Collections: products (plus the catalog lookup tables) and movements.
/// The movement collection is **append-only** — a mistaken movement is
/// corrected by appending a compensating one, never by editing history.
/// `cached_balance` is the only mutable shared field, and it moves only
/// through the guarded operations below.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Bulk scan of the catalog collections into an immutable snapshot.
    async fn catalog_snapshot(&self) -> Result<CatalogSnapshot, StoreError>;

    /// Point lookup of one product.
    async fn load_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Bulk scan of movements, optionally pre-filtered to one product's
    /// identity-keyed records.
    async fn list_movements(
        &self,
        product_id: Option<ProductId>,
    ) -> Result<Vec<Movement>, StoreError>;

    /// Append a movement and move the product's cached balance from
    /// `expected_balance` to `new_balance` in one atomic read-check-write.
    ///
    /// A concurrent balance change aborts with [`StoreError::Contention`]
    /// and nothing is written; the caller re-reads and retries.
    async fn append_with_balance(
        &self,
        movement: Movement,
        product_id: ProductId,
        expected_balance: f64,
        new_balance: f64,
    ) -> Result<MovementId, StoreError>;

    /// Compare-and-set of a product's cached balance; the reconciler's only
    /// write primitive.
    async fn compare_and_set_balance(
        &self,
        product_id: ProductId,
        expected: f64,
        new: f64,
    ) -> Result<CasOutcome, StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn catalog_snapshot(&self) -> Result<CatalogSnapshot, StoreError> {
        (**self).catalog_snapshot().await
    }

    async fn load_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).load_product(id).await
    }

    async fn list_movements(
        &self,
        product_id: Option<ProductId>,
    ) -> Result<Vec<Movement>, StoreError> {
        (**self).list_movements(product_id).await
    }

    async fn append_with_balance(
        &self,
        movement: Movement,
        product_id: ProductId,
        expected_balance: f64,
        new_balance: f64,
    ) -> Result<MovementId, StoreError> {
        (**self)
            .append_with_balance(movement, product_id, expected_balance, new_balance)
            .await
    }

    async fn compare_and_set_balance(
        &self,
        product_id: ProductId,
        expected: f64,
        new: f64,
    ) -> Result<CasOutcome, StoreError> {
        (**self).compare_and_set_balance(product_id, expected, new).await
    }
}

/// Maintenance surface used only by explicit, logged migrations.
///
/// Not part of the regular ledger contract: `rewrite_product_ref` exists
/// solely so the one-time reference migration can repair legacy keying.
/// Nothing else may touch a stored movement.
#[async_trait]
pub trait LedgerMaintenance: Send + Sync {
    async fn rewrite_product_ref(
        &self,
        movement_id: MovementId,
        new_ref: ProductRef,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> LedgerMaintenance for Arc<S>
where
    S: LedgerMaintenance + ?Sized,
{
    async fn rewrite_product_ref(
        &self,
        movement_id: MovementId,
        new_ref: ProductRef,
    ) -> Result<(), StoreError> {
        (**self).rewrite_product_ref(movement_id, new_ref).await
    }
}
