//! Write-back half of the projection pipeline.
//!
//! The projector plans corrections; this applies them through
//! compare-and-set, concurrently, and without ever feeding back into the
//! read path — callers already hold the authoritative values.

use stockroom_projector::{BALANCE_TOLERANCE, BalanceCorrection, project_product};

use crate::document_store::{CasOutcome, DocumentStore};

/// What happened to a batch of planned corrections.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Cached balances replaced with the computed value.
    pub corrected: usize,
    /// Found already within tolerance after a conflict re-projection.
    pub converged: usize,
    /// Given up after repeated contention or a store failure.
    pub skipped: usize,
}

/// Applies planned balance corrections.
///
/// One task per product; a contended product gets a single full
/// re-projection against fresh state before it is skipped.
#[derive(Debug, Clone)]
pub struct Reconciler<S> {
    store: S,
    tolerance: f64,
}

impl<S> Reconciler<S>
where
    S: DocumentStore + Clone + Send + Sync + 'static,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            tolerance: BALANCE_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub async fn apply(&self, corrections: Vec<BalanceCorrection>) -> ReconcileSummary {
        let mut handles = Vec::with_capacity(corrections.len());
        for correction in corrections {
            let store = self.store.clone();
            let tolerance = self.tolerance;
            handles.push(tokio::spawn(apply_one(store, correction, tolerance)));
        }

        let mut summary = ReconcileSummary::default();
        for handle in handles {
            match handle.await {
                Ok(Outcome::Corrected) => summary.corrected += 1,
                Ok(Outcome::Converged) => summary.converged += 1,
                Ok(Outcome::Skipped) | Err(_) => summary.skipped += 1,
            }
        }
        summary
    }
}

enum Outcome {
    Corrected,
    Converged,
    Skipped,
}

async fn apply_one<S: DocumentStore>(
    store: S,
    correction: BalanceCorrection,
    tolerance: f64,
) -> Outcome {
    match store
        .compare_and_set_balance(correction.product_id, correction.stored, correction.computed)
        .await
    {
        Ok(CasOutcome::Updated) => {
            tracing::info!(
                product = %correction.code,
                stored = correction.stored,
                computed = correction.computed,
                "corrected cached balance"
            );
            Outcome::Corrected
        }
        Ok(CasOutcome::Conflict { current }) => {
            tracing::debug!(
                product = %correction.code,
                current,
                "cached balance moved since projection; re-projecting once"
            );
            retry_after_conflict(store, correction, tolerance).await
        }
        Err(error) => {
            tracing::warn!(product = %correction.code, %error, "balance write-back failed");
            Outcome::Skipped
        }
    }
}

/// One full projection-and-reconcile cycle against fresh state, then stop.
async fn retry_after_conflict<S: DocumentStore>(
    store: S,
    correction: BalanceCorrection,
    tolerance: f64,
) -> Outcome {
    let (catalog, movements) = match (
        store.catalog_snapshot().await,
        store.list_movements(Some(correction.product_id)).await,
    ) {
        (Ok(catalog), Ok(movements)) => (catalog, movements),
        (Err(error), _) | (_, Err(error)) => {
            tracing::warn!(product = %correction.code, %error, "re-projection read failed");
            return Outcome::Skipped;
        }
    };

    let Some(product) = catalog.product(&correction.product_id) else {
        tracing::warn!(product = %correction.code, "product vanished before write-back");
        return Outcome::Skipped;
    };

    let balance = project_product(product, &catalog, &movements);
    if (balance.cached_balance - balance.current_stock).abs() <= tolerance {
        return Outcome::Converged;
    }

    match store
        .compare_and_set_balance(
            correction.product_id,
            balance.cached_balance,
            balance.current_stock,
        )
        .await
    {
        Ok(CasOutcome::Updated) => {
            tracing::info!(
                product = %correction.code,
                stored = balance.cached_balance,
                computed = balance.current_stock,
                "corrected cached balance after re-projection"
            );
            Outcome::Corrected
        }
        Ok(CasOutcome::Conflict { current }) => {
            tracing::warn!(
                product = %correction.code,
                current,
                "cached balance still contended; skipping write-back"
            );
            Outcome::Skipped
        }
        Err(error) => {
            tracing::warn!(product = %correction.code, %error, "balance write-back failed");
            Outcome::Skipped
        }
    }
}
