//! Immutable catalog snapshot.
//!
//! Each bulk scan of the catalog collections becomes one of these, passed by
//! reference into projection and write-path functions. Nothing closes over
//! shared mutable maps; a stale snapshot is simply re-taken.

use std::collections::HashMap;

use stockroom_core::{AddressingId, ConversionRuleId, LocationId, ProductId, SupplierId};

use crate::conversion::ConversionRule;
use crate::lookup::{Addressing, Location};
use crate::product::Product;
use crate::supplier::Supplier;

/// Point-in-time view of the catalog collections.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: HashMap<ProductId, Product>,
    suppliers: HashMap<SupplierId, Supplier>,
    conversion_rules: HashMap<ConversionRuleId, ConversionRule>,
    addressings: HashMap<AddressingId, Addressing>,
    locations: HashMap<LocationId, Location>,
}

impl CatalogSnapshot {
    pub fn from_parts(
        products: Vec<Product>,
        suppliers: Vec<Supplier>,
        conversion_rules: Vec<ConversionRule>,
        addressings: Vec<Addressing>,
        locations: Vec<Location>,
    ) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            suppliers: suppliers.into_iter().map(|s| (s.id, s)).collect(),
            conversion_rules: conversion_rules.into_iter().map(|r| (r.id, r)).collect(),
            addressings: addressings.into_iter().map(|a| (a.id, a)).collect(),
            locations: locations.into_iter().map(|l| (l.id, l)).collect(),
        }
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn supplier(&self, id: &SupplierId) -> Option<&Supplier> {
        self.suppliers.get(id)
    }

    pub fn conversion_rule(&self, id: &ConversionRuleId) -> Option<&ConversionRule> {
        self.conversion_rules.get(id)
    }

    /// Supplier configured on a product, if any.
    pub fn supplier_for(&self, product: &Product) -> Option<&Supplier> {
        product.supplier_id.as_ref().and_then(|id| self.suppliers.get(id))
    }

    /// Conversion rule configured on a product, if any.
    pub fn conversion_rule_for(&self, product: &Product) -> Option<&ConversionRule> {
        product
            .conversion_rule_id
            .as_ref()
            .and_then(|id| self.conversion_rules.get(id))
    }

    /// Display label for a product's addressing: `"CODE - Location"`.
    pub fn address_label(&self, product: &Product) -> Option<String> {
        let addressing = self
            .addressings
            .get(product.addressing_id.as_ref()?)?;
        let location = self
            .locations
            .get(&addressing.location_id)
            .map(|l| l.name.as_str())
            .unwrap_or("N/A");
        Some(format!("{} - {}", addressing.code, location))
    }
}
