use serde::{Deserialize, Serialize};

use stockroom_core::SupplierId;

/// Supplier record.
///
/// `surcharge_percent` is the tax surcharge (ST) configured per supplier.
/// It is baked into an entry's total cost exactly once, at write time; a
/// later rate change never reprices historical entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    #[serde(default)]
    pub surcharge_percent: f64,
}

impl Supplier {
    pub fn new(id: SupplierId, name: impl Into<String>, surcharge_percent: f64) -> Self {
        Self {
            id,
            name: name.into(),
            surcharge_percent,
        }
    }

    /// Multiplier applied to an entry's landed cost.
    ///
    /// Non-positive configured rates mean no surcharge.
    pub fn surcharge_multiplier(&self) -> f64 {
        if self.surcharge_percent > 0.0 {
            1.0 + self.surcharge_percent / 100.0
        } else {
            1.0
        }
    }
}
