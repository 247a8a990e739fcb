//! Application service over the document store.
//!
//! Write operations follow the transactional shape of the store: read the
//! product, decide, append with a balance guard, retry on contention.
//! Read operations always return freshly projected values; drifted caches
//! are corrected by a fire-and-forget reconciliation task that never blocks
//! the caller.

use chrono::Utc;
use thiserror::Error;

use stockroom_core::{DomainError, MovementId, ProductId};
use stockroom_ledger::{EntryDraft, ExitDraft, prepare_entry, prepare_exit};
use stockroom_projector::{
    BALANCE_TOLERANCE, ProductBalance, ProjectionReport, plan_corrections_with_tolerance,
    project_all, project_product,
};

use crate::document_store::{DocumentStore, StoreError};
use crate::reconciler::{ReconcileSummary, Reconciler};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Stock operations: transactional movement recording and projected queries.
#[derive(Debug, Clone)]
pub struct StockService<S> {
    store: S,
    max_attempts: u32,
    tolerance: f64,
}

impl<S> StockService<S>
where
    S: DocumentStore + Clone + Send + Sync + 'static,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            tolerance: BALANCE_TOLERANCE,
        }
    }

    /// Contention retry budget for the transactional write path.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Record a stock entry.
    ///
    /// Conversion and surcharge are applied here, once; the appended
    /// movement carries stock-unit quantities and a frozen total cost.
    pub async fn record_entry(&self, draft: EntryDraft) -> Result<MovementId, ServiceError> {
        let catalog = self.store.catalog_snapshot().await?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let product = self
                .store
                .load_product(draft.product_id)
                .await?
                .ok_or(DomainError::NotFound)?;
            let rule = catalog.conversion_rule_for(&product);
            let supplier = catalog.supplier_for(&product);

            let movement = prepare_entry(
                &draft,
                &product,
                rule,
                supplier,
                MovementId::new(),
                Utc::now(),
            )?;
            let delta = movement.cached_balance_delta();

            match self
                .store
                .append_with_balance(
                    movement,
                    product.id,
                    product.cached_balance,
                    product.cached_balance + delta,
                )
                .await
            {
                Ok(id) => {
                    tracing::info!(product = %product.code, movement = %id, "recorded entry");
                    return Ok(id);
                }
                Err(StoreError::Contention(reason)) if attempt < self.max_attempts => {
                    tracing::debug!(product = %product.code, %reason, "entry contended; retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    /// Record a stock exit.
    ///
    /// Bulk exits are checked against the balance read inside the
    /// transaction window and abort with `InsufficientStock` before anything
    /// is written.
    pub async fn record_exit(&self, draft: ExitDraft) -> Result<MovementId, ServiceError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let product = self
                .store
                .load_product(draft.product_id)
                .await?
                .ok_or(DomainError::NotFound)?;

            let movement = prepare_exit(
                &draft,
                &product,
                product.cached_balance,
                MovementId::new(),
                Utc::now(),
            )?;
            let delta = movement.cached_balance_delta();

            match self
                .store
                .append_with_balance(
                    movement,
                    product.id,
                    product.cached_balance,
                    product.cached_balance + delta,
                )
                .await
            {
                Ok(id) => {
                    tracing::info!(product = %product.code, movement = %id, "recorded exit");
                    return Ok(id);
                }
                Err(StoreError::Contention(reason)) if attempt < self.max_attempts => {
                    tracing::debug!(product = %product.code, %reason, "exit contended; retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    /// Project the whole catalog and return the fresh values immediately.
    ///
    /// Drifted cached balances are corrected in the background; the caller
    /// never waits on (or hears about) the write-back.
    pub async fn stock_overview(&self) -> Result<ProjectionReport, ServiceError> {
        let catalog = self.store.catalog_snapshot().await?;
        let movements = self.store.list_movements(None).await?;
        let report = project_all(&catalog, &movements);

        let corrections = plan_corrections_with_tolerance(&report, self.tolerance);
        if !corrections.is_empty() {
            tracing::info!(count = corrections.len(), "scheduling cached-balance corrections");
            let reconciler = Reconciler::new(self.store.clone()).with_tolerance(self.tolerance);
            tokio::spawn(async move {
                reconciler.apply(corrections).await;
            });
        }

        Ok(report)
    }

    /// Project a single product; `None` when it is not in the catalog.
    pub async fn product_balance(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductBalance>, ServiceError> {
        let catalog = self.store.catalog_snapshot().await?;
        let Some(product) = catalog.product(&product_id) else {
            return Ok(None);
        };

        let movements = self.store.list_movements(Some(product_id)).await?;
        Ok(Some(project_product(product, &catalog, &movements)))
    }

    /// Run one projection-and-reconcile cycle to completion.
    ///
    /// The deterministic counterpart of the background write-back in
    /// [`Self::stock_overview`]; useful for maintenance jobs and tests.
    pub async fn reconcile_now(&self) -> Result<ReconcileSummary, ServiceError> {
        let catalog = self.store.catalog_snapshot().await?;
        let movements = self.store.list_movements(None).await?;
        let report = project_all(&catalog, &movements);
        let corrections = plan_corrections_with_tolerance(&report, self.tolerance);

        let reconciler = Reconciler::new(self.store.clone()).with_tolerance(self.tolerance);
        Ok(reconciler.apply(corrections).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stockroom_catalog::{ConversionRule, Product, Supplier};
    use stockroom_core::{ConversionRuleId, SupplierId};

    use crate::document_store::InMemoryDocumentStore;

    fn service() -> (StockService<Arc<InMemoryDocumentStore>>, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        (StockService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn entry_converts_units_and_bumps_cached_balance() {
        let (service, store) = service();

        let rule = ConversionRule::new(ConversionRuleId::new(), "bar -> m", 1.0, 6.0);
        let mut product = Product::new(ProductId::new(), "100-01", "Bar");
        product.conversion_rule_id = Some(rule.id);
        let id = product.id;
        store.upsert_conversion_rule(rule);
        store.upsert_product(product);

        service.record_entry(EntryDraft::new(id, "2")).await.unwrap();

        let stored = store.load_product(id).await.unwrap().unwrap();
        assert_eq!(stored.cached_balance, 12.0);

        let movements = store.list_movements(Some(id)).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].quantity.value(), 12.0);
    }

    #[tokio::test]
    async fn entry_freezes_surcharged_total_cost() {
        let (service, store) = service();

        let supplier = Supplier::new(SupplierId::new(), "Acme Metals", 10.0);
        let mut product = Product::new(ProductId::new(), "100-01", "Bar");
        product.supplier_id = Some(supplier.id);
        let id = product.id;
        store.upsert_supplier(supplier);
        store.upsert_product(product);

        let mut draft = EntryDraft::new(id, "100");
        draft.unit_price = "2,00".to_string();
        draft.tax_icms = "10".to_string();
        draft.tax_ipi = "5".to_string();
        draft.freight = "5".to_string();
        service.record_entry(draft).await.unwrap();

        let movements = store.list_movements(Some(id)).await.unwrap();
        let total = movements[0].entry.as_ref().unwrap().total_entry_cost.unwrap();
        assert!((total - 242.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn insufficient_exit_aborts_before_writing() {
        let (service, store) = service();

        let mut product = Product::new(ProductId::new(), "100-01", "Bar");
        product.cached_balance = 10.0;
        let id = product.id;
        store.upsert_product(product);

        let err = service.record_exit(ExitDraft::new(id, "25")).await.unwrap_err();
        match err {
            ServiceError::Domain(DomainError::InsufficientStock { available }) => {
                assert_eq!(available, 10.0);
            }
            other => panic!("expected insufficient stock, got {other:?}"),
        }

        assert!(store.list_movements(Some(id)).await.unwrap().is_empty());
        assert_eq!(store.load_product(id).await.unwrap().unwrap().cached_balance, 10.0);
    }

    #[tokio::test]
    async fn exit_for_missing_product_is_not_found() {
        let (service, _store) = service();
        let err = service
            .record_exit(ExitDraft::new(ProductId::new(), "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn overview_returns_fresh_values_even_when_cache_is_stale() {
        let (service, store) = service();

        let mut product = Product::new(ProductId::new(), "100-01", "Bar");
        product.cached_balance = 999.0; // stale by hand-edit
        let id = product.id;
        store.upsert_product(product);

        service.record_entry(EntryDraft::new(id, "5")).await.unwrap();

        let report = service.stock_overview().await.unwrap();
        assert_eq!(report.balance(&id).unwrap().current_stock, 5.0);

        // The deterministic cycle converges the cache to the computed value.
        let summary = service.reconcile_now().await.unwrap();
        assert_eq!(summary.skipped, 0);
        assert_eq!(store.load_product(id).await.unwrap().unwrap().cached_balance, 5.0);
    }
}
