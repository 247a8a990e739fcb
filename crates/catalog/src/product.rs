use serde::{Deserialize, Serialize};

use stockroom_core::{AddressingId, ConversionRuleId, GroupId, ProductId, SupplierId};

/// Catalog record for a stocked product.
///
/// `code` is the human-facing identifier operators type and print on labels.
/// It is supposed to be unique but nothing enforces that; every internal
/// reference uses `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    /// Customer/standard-facing code, when one exists.
    #[serde(default)]
    pub global_code: Option<String>,
    pub description: String,
    /// Stock unit of measure — what balances are kept in.
    pub unit: String,
    /// Purchase unit, when it differs from the stock unit.
    #[serde(default)]
    pub purchase_unit: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub addressing_id: Option<AddressingId>,
    #[serde(default)]
    pub conversion_rule_id: Option<ConversionRuleId>,
    /// Denormalized stock quantity kept for fast display.
    ///
    /// Mutated only by the transactional write path and the reconciler's
    /// compare-and-set, never by hand. May drift from the computed balance;
    /// the projector is the authority.
    #[serde(default)]
    pub cached_balance: f64,
}

impl Product {
    /// Minimal product for tests and seeding.
    pub fn new(id: ProductId, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            global_code: None,
            description: description.into(),
            unit: "un".to_string(),
            purchase_unit: None,
            color: None,
            supplier_id: None,
            group_id: None,
            addressing_id: None,
            conversion_rule_id: None,
            cached_balance: 0.0,
        }
    }
}
