use serde::{Deserialize, Serialize};

use stockroom_core::ConversionRuleId;

/// Factor pair translating a purchase-unit quantity into stock units.
///
/// Example: bars bought by length, stocked by meter — `purchase_factor` 1 bar,
/// `stock_factor` 6 meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRule {
    pub id: ConversionRuleId,
    pub name: String,
    /// Quantity in the purchase unit that corresponds to `stock_factor`.
    pub purchase_factor: f64,
    /// Quantity in the stock unit that `purchase_factor` converts to.
    pub stock_factor: f64,
}

impl ConversionRule {
    pub fn new(
        id: ConversionRuleId,
        name: impl Into<String>,
        purchase_factor: f64,
        stock_factor: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            purchase_factor,
            stock_factor,
        }
    }

    /// Express a purchase-unit quantity in stock units.
    ///
    /// A non-positive purchase factor disables the rule; the raw quantity
    /// passes through unchanged.
    pub fn to_stock_units(&self, purchase_quantity: f64) -> f64 {
        if self.purchase_factor > 0.0 {
            purchase_quantity / self.purchase_factor * self.stock_factor
        } else {
            purchase_quantity
        }
    }
}
