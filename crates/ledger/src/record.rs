//! Write-side decision logic.
//!
//! Pure decide-then-commit: these functions validate operator input against a
//! freshly read product and produce the movement to append. Unit conversion
//! and supplier surcharge are write-time concerns — the stored movement
//! already carries stock-unit quantities and a frozen total cost, so the
//! projector never re-derives either.

use chrono::{DateTime, Utc};

use stockroom_catalog::{ConversionRule, Product, Supplier};
use stockroom_core::{
    DomainError, DomainResult, EntryTypeId, ExitTypeId, LenientQuantity, MovementId, ProductId,
    WorkId, parse_lenient_decimal,
};

use crate::movement::{EntryCosts, Movement, MovementKind, ProductRef};

/// Operator input for recording an entry. Numeric fields arrive as typed,
/// locale-ambiguous text.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub product_id: ProductId,
    /// Quantity in the purchase unit.
    pub quantity: String,
    pub unit_price: String,
    pub tax_icms: String,
    pub tax_ipi: String,
    pub freight: String,
    pub entry_type_id: Option<EntryTypeId>,
    pub invoice_number: Option<String>,
    pub piece_label: Option<String>,
    pub note: Option<String>,
}

impl EntryDraft {
    pub fn new(product_id: ProductId, quantity: impl Into<String>) -> Self {
        Self {
            product_id,
            quantity: quantity.into(),
            unit_price: String::new(),
            tax_icms: String::new(),
            tax_ipi: String::new(),
            freight: String::new(),
            entry_type_id: None,
            invoice_number: None,
            piece_label: None,
            note: None,
        }
    }
}

/// Operator input for recording an exit.
#[derive(Debug, Clone)]
pub struct ExitDraft {
    pub product_id: ProductId,
    pub quantity: String,
    /// Selecting a label turns this into an offcut exit.
    pub piece_label: Option<String>,
    pub exit_type_id: Option<ExitTypeId>,
    pub work_id: Option<WorkId>,
    pub requester: Option<String>,
    pub note: Option<String>,
}

impl ExitDraft {
    pub fn new(product_id: ProductId, quantity: impl Into<String>) -> Self {
        Self {
            product_id,
            quantity: quantity.into(),
            piece_label: None,
            exit_type_id: None,
            work_id: None,
            requester: None,
            note: None,
        }
    }
}

/// Validate an entry draft and build the movement to append.
///
/// Conversion: with a rule configured, the stored `quantity` is the
/// purchase quantity expressed in stock units; the raw figure is kept in
/// `purchase_quantity`. Cost: when the unit price is positive, the landed
/// cost (quantity × price + taxes + freight) is computed here, the supplier
/// surcharge applied exactly once, and the result frozen on the movement.
pub fn prepare_entry(
    draft: &EntryDraft,
    product: &Product,
    rule: Option<&ConversionRule>,
    supplier: Option<&Supplier>,
    id: MovementId,
    recorded_at: DateTime<Utc>,
) -> DomainResult<Movement> {
    if draft.product_id != product.id {
        return Err(DomainError::invariant("entry drafted against a different product"));
    }

    let purchase_quantity = parse_lenient_decimal(&draft.quantity);
    if purchase_quantity <= 0.0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }

    let stock_quantity = match rule {
        Some(rule) => rule.to_stock_units(purchase_quantity),
        None => purchase_quantity,
    };

    let unit_price = parse_lenient_decimal(&draft.unit_price);
    let tax_icms = parse_lenient_decimal(&draft.tax_icms);
    let tax_ipi = parse_lenient_decimal(&draft.tax_ipi);
    let freight = parse_lenient_decimal(&draft.freight);

    let total_entry_cost = (unit_price > 0.0).then(|| {
        let landed = purchase_quantity * unit_price + tax_icms + tax_ipi + freight;
        landed * supplier.map(Supplier::surcharge_multiplier).unwrap_or(1.0)
    });

    Ok(Movement {
        id,
        kind: MovementKind::Entry,
        product_ref: ProductRef::from_id(product.id),
        quantity: LenientQuantity::new(stock_quantity),
        piece_label: draft.piece_label.clone(),
        recorded_at,
        entry: Some(EntryCosts {
            unit_price: LenientQuantity::new(unit_price),
            tax_icms: LenientQuantity::new(tax_icms),
            tax_ipi: LenientQuantity::new(tax_ipi),
            freight: LenientQuantity::new(freight),
            purchase_quantity: Some(LenientQuantity::new(purchase_quantity)),
            total_entry_cost,
        }),
        entry_type_id: draft.entry_type_id,
        invoice_number: draft.invoice_number.clone(),
        exit_type_id: None,
        work_id: None,
        requester: None,
        note: draft.note.clone(),
    })
}

/// Validate an exit draft and build the movement to append.
///
/// `available` is the product's cached balance read inside the transaction
/// window; a bulk exit larger than it aborts before anything is written.
/// Offcut exits skip the bulk check — their availability is the per-label
/// count, surfaced by the projector.
pub fn prepare_exit(
    draft: &ExitDraft,
    product: &Product,
    available: f64,
    id: MovementId,
    recorded_at: DateTime<Utc>,
) -> DomainResult<Movement> {
    if draft.product_id != product.id {
        return Err(DomainError::invariant("exit drafted against a different product"));
    }

    let quantity = parse_lenient_decimal(&draft.quantity);
    if quantity <= 0.0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }

    let piece_label = draft
        .piece_label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    if piece_label.is_none() && available < quantity {
        return Err(DomainError::insufficient_stock(available));
    }

    Ok(Movement {
        id,
        kind: MovementKind::Exit,
        product_ref: ProductRef::from_id(product.id),
        quantity: LenientQuantity::new(quantity),
        piece_label,
        recorded_at,
        entry: None,
        entry_type_id: None,
        invoice_number: None,
        exit_type_id: draft.exit_type_id,
        work_id: draft.work_id,
        requester: draft.requester.clone(),
        note: draft.note.clone(),
    })
}
