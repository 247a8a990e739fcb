//! The balance projector.
//!
//! Folds a product's full movement history into current bulk stock, per-label
//! offcut counts, and weighted-average unit cost. The fold trusts the
//! quantities stored on movements (unit conversion happened at write time)
//! and never mutates anything — write-back is planned separately.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use stockroom_catalog::{CatalogSnapshot, Product};
use stockroom_core::{LenientQuantity, ProductId};
use stockroom_ledger::{Movement, MovementKind};

use crate::resolve::{OrphanMovement, Resolution, resolve_product_ref};

/// Authoritative state for one product, computed from full movement history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductBalance {
    pub product_id: ProductId,
    pub code: String,
    pub description: String,
    pub unit: String,
    /// Signed: negative stock is a data-integrity warning, surfaced as-is.
    pub current_stock: f64,
    pub weighted_avg_cost: f64,
    pub total_stock_value: f64,
    /// Raw per-label offcut counts, exhausted labels included (audit view).
    pub piece_inventory: BTreeMap<String, i64>,
    /// Denormalized balance as stored on the product when the projection ran.
    pub cached_balance: f64,
    /// Shelf/bin display label, when the product is addressed.
    pub address_label: Option<String>,
}

impl ProductBalance {
    /// Offcut labels with a positive remaining count.
    pub fn available_pieces(&self) -> impl Iterator<Item = (&str, i64)> {
        self.piece_inventory
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(label, count)| (label.as_str(), *count))
    }

    /// Total offcut units on hand across all labels.
    pub fn piece_total(&self) -> i64 {
        self.piece_inventory.values().sum()
    }

    pub fn has_negative_stock(&self) -> bool {
        self.current_stock < 0.0
    }
}

/// Output of a projection run over the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionReport {
    /// One balance per catalog product, ordered by code.
    pub balances: Vec<ProductBalance>,
    /// Movements that resolved to no product; for operator follow-up.
    pub orphans: Vec<OrphanMovement>,
}

impl ProjectionReport {
    pub fn balance(&self, product_id: &ProductId) -> Option<&ProductBalance> {
        self.balances.iter().find(|b| b.product_id == *product_id)
    }
}

/// Project every catalog product from the full movement scan.
///
/// Unresolvable movements are excluded, logged, and reported; they never
/// abort the run or leak into another product's balance.
pub fn project_all(catalog: &CatalogSnapshot, movements: &[Movement]) -> ProjectionReport {
    let mut by_product: HashMap<ProductId, Vec<&Movement>> = HashMap::new();
    let mut orphans = Vec::new();

    for movement in movements {
        match resolve_product_ref(movement, catalog) {
            Resolution::Resolved(id) => by_product.entry(id).or_default().push(movement),
            Resolution::Orphan(reason) => {
                tracing::warn!(
                    movement_id = %movement.id,
                    product_ref = %movement.product_ref,
                    ?reason,
                    "movement excluded from projection: unresolvable product reference"
                );
                orphans.push(OrphanMovement {
                    movement_id: movement.id,
                    product_ref: movement.product_ref.as_str().to_string(),
                    reason,
                });
            }
        }
    }

    let mut balances: Vec<ProductBalance> = catalog
        .products()
        .map(|product| {
            let history = by_product.get(&product.id).map(Vec::as_slice).unwrap_or(&[]);
            fold_balance(product, catalog, history.iter().copied())
        })
        .collect();

    balances.sort_by(|a, b| {
        a.code
            .cmp(&b.code)
            .then_with(|| a.product_id.as_uuid().cmp(b.product_id.as_uuid()))
    });

    ProjectionReport { balances, orphans }
}

/// Project a single product from a movement scan.
///
/// Movements that do not resolve to this product are ignored here; run
/// [`project_all`] for orphan diagnostics.
pub fn project_product(
    product: &Product,
    catalog: &CatalogSnapshot,
    movements: &[Movement],
) -> ProductBalance {
    let history = movements
        .iter()
        .filter(|m| resolve_product_ref(m, catalog) == Resolution::Resolved(product.id));
    fold_balance(product, catalog, history)
}

fn fold_balance<'a>(
    product: &Product,
    catalog: &CatalogSnapshot,
    movements: impl Iterator<Item = &'a Movement>,
) -> ProductBalance {
    let mut entries_total = 0.0_f64;
    let mut exits_total = 0.0_f64;
    let mut pieces: BTreeMap<String, i64> = BTreeMap::new();
    let mut cost_total = 0.0_f64;
    let mut cost_quantity = 0.0_f64;

    for movement in movements {
        if let Some(label) = movement.piece_label_trimmed() {
            let count = piece_count(movement.quantity);
            let slot = pieces.entry(label.to_string()).or_insert(0);
            match movement.kind {
                MovementKind::Entry => *slot += count,
                MovementKind::Exit => *slot -= count,
            }
            continue;
        }

        let quantity = movement.quantity.value();
        match movement.kind {
            MovementKind::Entry => {
                entries_total += quantity;
                if let Some(costs) = &movement.entry {
                    let unit_price = costs.unit_price.value();
                    if unit_price > 0.0 {
                        let purchase_quantity = costs
                            .purchase_quantity
                            .map(LenientQuantity::value)
                            .unwrap_or(quantity);
                        // Legacy entries carry no frozen total; rebuild it from the
                        // raw components, without surcharge (write-time concern).
                        let total = costs.total_entry_cost.unwrap_or_else(|| {
                            purchase_quantity * unit_price
                                + costs.tax_icms.value()
                                + costs.tax_ipi.value()
                                + costs.freight.value()
                        });
                        cost_total += total;
                        cost_quantity += quantity;
                    }
                }
            }
            MovementKind::Exit => exits_total += quantity,
        }
    }

    let current_stock = entries_total - exits_total;
    let weighted_avg_cost = if cost_quantity > 0.0 {
        cost_total / cost_quantity
    } else {
        0.0
    };

    ProductBalance {
        product_id: product.id,
        code: product.code.clone(),
        description: product.description.clone(),
        unit: product.unit.clone(),
        current_stock,
        weighted_avg_cost,
        total_stock_value: current_stock * weighted_avg_cost,
        piece_inventory: pieces,
        cached_balance: product.cached_balance,
        address_label: catalog.address_label(product),
    }
}

/// Offcut movements count ±1 unless they carry an explicit positive quantity.
fn piece_count(quantity: LenientQuantity) -> i64 {
    let value = quantity.value();
    if value > 0.0 { value.trunc() as i64 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use stockroom_core::MovementId;
    use stockroom_ledger::{EntryCosts, ProductRef};

    fn catalog_with(products: Vec<Product>) -> CatalogSnapshot {
        CatalogSnapshot::from_parts(products, vec![], vec![], vec![], vec![])
    }

    fn movement(product_id: ProductId, kind: MovementKind, quantity: LenientQuantity) -> Movement {
        Movement {
            id: MovementId::new(),
            kind,
            product_ref: ProductRef::from_id(product_id),
            quantity,
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

    fn priced_entry(product_id: ProductId, quantity: f64, unit_price: f64) -> Movement {
        let mut m = movement(product_id, MovementKind::Entry, LenientQuantity::new(quantity));
        m.entry = Some(EntryCosts {
            unit_price: LenientQuantity::new(unit_price),
            ..EntryCosts::default()
        });
        m
    }

    #[test]
    fn empty_history_projects_to_zeros() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let balance = project_product(&product, &catalog, &[]);
        assert_eq!(balance.current_stock, 0.0);
        assert_eq!(balance.weighted_avg_cost, 0.0);
        assert_eq!(balance.total_stock_value, 0.0);
        assert!(balance.piece_inventory.is_empty());
    }

    #[test]
    fn worked_scenario_entry_with_taxes_then_exit() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let mut entry = movement(product.id, MovementKind::Entry, LenientQuantity::new(100.0));
        entry.entry = Some(EntryCosts {
            unit_price: LenientQuantity::new(2.0),
            tax_icms: LenientQuantity::new(10.0),
            tax_ipi: LenientQuantity::new(5.0),
            freight: LenientQuantity::new(5.0),
            purchase_quantity: None,
            total_entry_cost: None,
        });
        let exit = movement(product.id, MovementKind::Exit, LenientQuantity::new(40.0));

        let balance = project_product(&product, &catalog, &[entry, exit]);
        assert!((balance.current_stock - 60.0).abs() < 1e-9);
        assert!((balance.weighted_avg_cost - 2.2).abs() < 1e-9);
        assert!((balance.total_stock_value - 132.0).abs() < 1e-9);
    }

    #[test]
    fn frozen_total_cost_wins_over_raw_components() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let mut entry = movement(product.id, MovementKind::Entry, LenientQuantity::new(10.0));
        entry.entry = Some(EntryCosts {
            unit_price: LenientQuantity::new(2.0),
            tax_icms: LenientQuantity::new(999.0), // stale components must be ignored
            total_entry_cost: Some(33.0),
            ..EntryCosts::default()
        });

        let balance = project_product(&product, &catalog, &[entry]);
        assert!((balance.weighted_avg_cost - 3.3).abs() < 1e-9);
    }

    #[test]
    fn unpriced_entries_move_stock_but_not_cost() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let free = movement(product.id, MovementKind::Entry, LenientQuantity::new(30.0));
        let paid = priced_entry(product.id, 10.0, 5.0);

        let balance = project_product(&product, &catalog, &[free, paid]);
        assert_eq!(balance.current_stock, 40.0);
        assert_eq!(balance.weighted_avg_cost, 5.0);
    }

    #[test]
    fn comma_and_dot_quantities_project_identically() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let comma = movement(product.id, MovementKind::Entry, LenientQuantity::parse("10,5"));
        let dot = movement(product.id, MovementKind::Entry, LenientQuantity::parse("10.5"));

        let a = project_product(&product, &catalog, &[comma]);
        let b = project_product(&product, &catalog, &[dot]);
        assert_eq!(a.current_stock, 10.5);
        assert_eq!(a.current_stock, b.current_stock);
    }

    #[test]
    fn malformed_quantity_counts_as_zero_without_aborting() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let good = movement(product.id, MovementKind::Entry, LenientQuantity::new(8.0));
        let bad = movement(product.id, MovementKind::Entry, LenientQuantity::parse("n/a"));

        let balance = project_product(&product, &catalog, &[good, bad]);
        assert_eq!(balance.current_stock, 8.0);
    }

    #[test]
    fn negative_stock_is_surfaced_not_clamped() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let exit = movement(product.id, MovementKind::Exit, LenientQuantity::new(3.0));
        let balance = project_product(&product, &catalog, &[exit]);
        assert_eq!(balance.current_stock, -3.0);
        assert!(balance.has_negative_stock());
    }

    #[test]
    fn piece_lifecycle_exhausts_label_but_keeps_it_for_audit() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let mut in_piece = movement(product.id, MovementKind::Entry, LenientQuantity::parse(""));
        in_piece.piece_label = Some("1500mm".to_string());
        let mut out_piece = movement(product.id, MovementKind::Exit, LenientQuantity::parse(""));
        out_piece.piece_label = Some("1500mm".to_string());

        let balance = project_product(&product, &catalog, &[in_piece, out_piece]);
        assert_eq!(balance.piece_inventory.get("1500mm"), Some(&0));
        assert_eq!(balance.available_pieces().count(), 0);
        // Offcut movements never leak into the bulk figure.
        assert_eq!(balance.current_stock, 0.0);
    }

    #[test]
    fn piece_movements_use_explicit_quantity_when_positive() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let mut batch = movement(product.id, MovementKind::Entry, LenientQuantity::new(3.0));
        batch.piece_label = Some("800mm".to_string());
        let mut one_out = movement(product.id, MovementKind::Exit, LenientQuantity::parse(""));
        one_out.piece_label = Some(" 800mm ".to_string());

        let balance = project_product(&product, &catalog, &[batch, one_out]);
        assert_eq!(balance.piece_inventory.get("800mm"), Some(&2));
        assert_eq!(balance.piece_total(), 2);
        assert_eq!(balance.available_pieces().collect::<Vec<_>>(), vec![("800mm", 2)]);
    }

    #[test]
    fn orphans_are_reported_and_other_products_unaffected() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let good = movement(product.id, MovementKind::Entry, LenientQuantity::new(5.0));
        let mut stray = movement(product.id, MovementKind::Entry, LenientQuantity::new(99.0));
        stray.product_ref = ProductRef::new("18195-000");

        let report = project_all(&catalog, &[good, stray.clone()]);
        assert_eq!(report.balances.len(), 1);
        assert_eq!(report.balance(&product.id).unwrap().current_stock, 5.0);
        assert_eq!(report.orphans.len(), 1);
        assert_eq!(report.orphans[0].movement_id, stray.id);
        assert_eq!(report.orphans[0].product_ref, "18195-000");
    }

    #[test]
    fn entry_then_exit_of_same_quantity_round_trips() {
        let product = Product::new(ProductId::new(), "100-01", "Bar");
        let catalog = catalog_with(vec![product.clone()]);

        let baseline = movement(product.id, MovementKind::Entry, LenientQuantity::new(7.3));
        let before = project_product(&product, &catalog, std::slice::from_ref(&baseline));

        let entry = movement(product.id, MovementKind::Entry, LenientQuantity::new(12.75));
        let exit = movement(product.id, MovementKind::Exit, LenientQuantity::new(12.75));
        let after = project_product(&product, &catalog, &[baseline, entry, exit]);

        assert!((after.current_stock - before.current_stock).abs() <= 1e-4);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the bulk fold is a plain sum per kind, so any reordering
        /// of the history yields the same stock (within float noise).
        #[test]
        fn bulk_balance_is_order_independent(
            quantities in prop::collection::vec((any::<bool>(), 0.0_f64..1000.0), 1..50)
        ) {
            let product = Product::new(ProductId::new(), "100-01", "Bar");
            let catalog = catalog_with(vec![product.clone()]);

            let movements: Vec<Movement> = quantities
                .iter()
                .map(|(is_entry, q)| {
                    let kind = if *is_entry { MovementKind::Entry } else { MovementKind::Exit };
                    movement(product.id, kind, LenientQuantity::new(*q))
                })
                .collect();

            let forward = project_product(&product, &catalog, &movements);

            let mut reversed = movements.clone();
            reversed.reverse();
            let mut rotated = movements.clone();
            rotated.rotate_left(movements.len() / 2);

            let reversed = project_product(&product, &catalog, &reversed);
            let rotated = project_product(&product, &catalog, &rotated);

            prop_assert!((forward.current_stock - reversed.current_stock).abs() < 1e-6);
            prop_assert!((forward.current_stock - rotated.current_stock).abs() < 1e-6);
        }
    }
}
