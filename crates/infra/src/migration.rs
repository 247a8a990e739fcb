//! One-time repair of legacy product references.
//!
//! Old movement documents were keyed by whatever the form had at hand: the
//! product's display code, or an identifier with incidental whitespace.
//! Rather than tolerating those at read time with fallback lookups, this
//! pass rewrites each one to the product's identity — once, explicitly, and
//! with every rewrite logged — so the single resolution rule holds for all
//! records afterwards.

use std::collections::HashMap;

use stockroom_core::{MovementId, ProductId};
use stockroom_ledger::ProductRef;

use crate::document_store::{DocumentStore, LedgerMaintenance, StoreError};

/// What the migration did, for the operator's audit trail.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RefMigrationReport {
    pub scanned: usize,
    /// Already identity-keyed; untouched.
    pub already_keyed: usize,
    pub rewritten: usize,
    /// Movements whose reference matched no identity and no unique code.
    pub unresolved: Vec<MovementId>,
}

/// Rewrite legacy code-keyed and whitespace-padded references to identities.
///
/// A display code is matched only when exactly one product carries it —
/// codes are supposed to be unique but nothing enforces that, and an
/// ambiguous match is never guessed.
pub async fn migrate_product_refs<S>(store: &S) -> Result<RefMigrationReport, StoreError>
where
    S: DocumentStore + LedgerMaintenance,
{
    let catalog = store.catalog_snapshot().await?;

    // Code index built once; duplicates poison the slot.
    let mut by_code: HashMap<&str, Option<ProductId>> = HashMap::new();
    for product in catalog.products() {
        by_code
            .entry(product.code.trim())
            .and_modify(|slot| *slot = None)
            .or_insert(Some(product.id));
    }

    let movements = store.list_movements(None).await?;
    let mut report = RefMigrationReport {
        scanned: movements.len(),
        ..RefMigrationReport::default()
    };

    for movement in &movements {
        let raw = movement.product_ref.as_str();

        if let Ok(id) = raw.parse::<ProductId>() {
            if catalog.product(&id).is_some() {
                report.already_keyed += 1;
                continue;
            }
        }

        let trimmed = raw.trim();
        let target = match trimmed.parse::<ProductId>() {
            Ok(id) if catalog.product(&id).is_some() => Some(id),
            _ => by_code.get(trimmed).copied().flatten(),
        };

        match target {
            Some(id) => {
                store
                    .rewrite_product_ref(movement.id, ProductRef::from_id(id))
                    .await?;
                tracing::info!(
                    movement_id = %movement.id,
                    from = raw,
                    to = %id,
                    "rewrote legacy product reference"
                );
                report.rewritten += 1;
            }
            None => {
                tracing::warn!(
                    movement_id = %movement.id,
                    product_ref = raw,
                    "could not resolve legacy product reference"
                );
                report.unresolved.push(movement.id);
            }
        }
    }

    Ok(report)
}
