use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{
    EntryTypeId, ExitTypeId, LenientQuantity, MovementId, ProductId, WorkId,
};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entry,
    Exit,
}

/// Raw, as-stored reference from a movement to a product.
///
/// Legacy documents are known to hold display codes or whitespace-padded
/// identifiers here, so the reference stays an opaque string until it goes
/// through resolution. New movements always write the product identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRef(String);

impl ProductRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_id(id: ProductId) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cost components recorded on entry movements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryCosts {
    pub unit_price: LenientQuantity,
    pub tax_icms: LenientQuantity,
    pub tax_ipi: LenientQuantity,
    pub freight: LenientQuantity,
    /// Quantity as typed by the operator, before unit conversion.
    #[serde(default)]
    pub purchase_quantity: Option<LenientQuantity>,
    /// Landed cost for the whole entry, computed and frozen at write time
    /// (supplier surcharge included). Absent on legacy records; the
    /// projector then falls back to the raw components.
    #[serde(default)]
    pub total_entry_cost: Option<f64>,
}

/// One immutable ledger record of stock entering or leaving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub kind: MovementKind,
    pub product_ref: ProductRef,
    /// Quantity in stock units (conversion already applied at write time).
    pub quantity: LenientQuantity,
    /// Non-blank label marks this movement as affecting a named offcut
    /// rather than the bulk quantity.
    #[serde(default)]
    pub piece_label: Option<String>,
    pub recorded_at: DateTime<Utc>,
    /// Present on entries only.
    #[serde(default)]
    pub entry: Option<EntryCosts>,
    #[serde(default)]
    pub entry_type_id: Option<EntryTypeId>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub exit_type_id: Option<ExitTypeId>,
    #[serde(default)]
    pub work_id: Option<WorkId>,
    #[serde(default)]
    pub requester: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Movement {
    /// Whether this movement tracks a named offcut instead of bulk stock.
    pub fn is_piece(&self) -> bool {
        self.piece_label_trimmed().is_some()
    }

    /// The piece label with incidental whitespace removed; `None` when blank.
    pub fn piece_label_trimmed(&self) -> Option<&str> {
        match self.piece_label.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(label) => Some(label),
        }
    }

    /// Contribution of this movement to the product's bulk cached balance.
    ///
    /// Piece movements never touch the bulk balance.
    pub fn cached_balance_delta(&self) -> f64 {
        if self.is_piece() {
            return 0.0;
        }
        match self.kind {
            MovementKind::Entry => self.quantity.value(),
            MovementKind::Exit => -self.quantity.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(kind: MovementKind, quantity: f64) -> Movement {
        Movement {
            id: MovementId::new(),
            kind,
            product_ref: ProductRef::from_id(ProductId::new()),
            quantity: LenientQuantity::new(quantity),
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

    #[test]
    fn blank_piece_labels_count_as_bulk() {
        let mut m = bare(MovementKind::Entry, 5.0);
        assert!(!m.is_piece());

        m.piece_label = Some("   ".to_string());
        assert!(!m.is_piece());

        m.piece_label = Some(" 1500mm ".to_string());
        assert!(m.is_piece());
        assert_eq!(m.piece_label_trimmed(), Some("1500mm"));
    }

    #[test]
    fn balance_delta_is_signed_and_zero_for_pieces() {
        assert_eq!(bare(MovementKind::Entry, 5.0).cached_balance_delta(), 5.0);
        assert_eq!(bare(MovementKind::Exit, 5.0).cached_balance_delta(), -5.0);

        let mut piece = bare(MovementKind::Entry, 1.0);
        piece.piece_label = Some("800mm".to_string());
        assert_eq!(piece.cached_balance_delta(), 0.0);
    }

    #[test]
    fn legacy_document_with_string_quantity_deserializes() {
        let raw = r#"{
            "id": "0198f6a2-0000-7000-8000-000000000001",
            "kind": "entry",
            "product_ref": " some-legacy-code ",
            "quantity": "12,5",
            "recorded_at": "2024-03-01T12:00:00Z"
        }"#;

        let m: Movement = serde_json::from_str(raw).unwrap();
        assert_eq!(m.kind, MovementKind::Entry);
        assert_eq!(m.quantity.value(), 12.5);
        assert_eq!(m.product_ref.as_str(), " some-legacy-code ");
        assert!(m.entry.is_none());
    }
}
