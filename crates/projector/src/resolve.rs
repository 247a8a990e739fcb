//! Product reference resolution.
//!
//! Exactly one strategy, applied uniformly: the stored reference must parse
//! as a product identifier and that identifier must exist in the snapshot.
//! There is no fallback to display codes and no whitespace forgiveness —
//! records that need either are repaired once by the explicit migration in
//! the infra layer, so that every balance stays auditable against a single
//! resolution rule.

use serde::Serialize;

use stockroom_catalog::CatalogSnapshot;
use stockroom_core::{MovementId, ProductId};
use stockroom_ledger::Movement;

/// Why a movement could not be linked to a catalog product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanReason {
    /// The stored reference is not a well-formed product identifier.
    MalformedRef,
    /// The reference is well-formed but no product carries that identity.
    UnknownProduct,
}

/// A movement that could not be linked to any catalog product.
///
/// Kept out of all balances and listed for operator follow-up; never
/// silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanMovement {
    pub movement_id: MovementId,
    pub product_ref: String,
    pub reason: OrphanReason,
}

/// Outcome of resolving a movement's product reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ProductId),
    Orphan(OrphanReason),
}

/// Resolve a movement's product reference by direct identity lookup.
pub fn resolve_product_ref(movement: &Movement, catalog: &CatalogSnapshot) -> Resolution {
    let raw = movement.product_ref.as_str();
    let Ok(id) = raw.parse::<ProductId>() else {
        return Resolution::Orphan(OrphanReason::MalformedRef);
    };
    if catalog.product(&id).is_some() {
        Resolution::Resolved(id)
    } else {
        Resolution::Orphan(OrphanReason::UnknownProduct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockroom_catalog::Product;
    use stockroom_core::LenientQuantity;
    use stockroom_ledger::{MovementKind, ProductRef};

    fn movement_with_ref(raw: &str) -> Movement {
        Movement {
            id: MovementId::new(),
            kind: MovementKind::Entry,
            product_ref: ProductRef::new(raw),
            quantity: LenientQuantity::new(1.0),
            piece_label: None,
            recorded_at: Utc::now(),
            entry: None,
            entry_type_id: None,
            invoice_number: None,
            exit_type_id: None,
            work_id: None,
            requester: None,
            note: None,
        }
    }

    fn snapshot_with(product: Product) -> CatalogSnapshot {
        CatalogSnapshot::from_parts(vec![product], vec![], vec![], vec![], vec![])
    }

    #[test]
    fn exact_identity_resolves() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let id = product.id;
        let catalog = snapshot_with(product);

        let m = movement_with_ref(&id.to_string());
        assert_eq!(resolve_product_ref(&m, &catalog), Resolution::Resolved(id));
    }

    #[test]
    fn padded_identity_and_display_code_are_orphans() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let id = product.id;
        let catalog = snapshot_with(product);

        let padded = movement_with_ref(&format!(" {id} "));
        assert_eq!(
            resolve_product_ref(&padded, &catalog),
            Resolution::Orphan(OrphanReason::MalformedRef)
        );

        let by_code = movement_with_ref("100-01");
        assert_eq!(
            resolve_product_ref(&by_code, &catalog),
            Resolution::Orphan(OrphanReason::MalformedRef)
        );

        let unknown = movement_with_ref(&ProductId::new().to_string());
        assert_eq!(
            resolve_product_ref(&unknown, &catalog),
            Resolution::Orphan(OrphanReason::UnknownProduct)
        );
    }
}
