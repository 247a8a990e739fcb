use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockroom_catalog::{
    Addressing, CatalogSnapshot, ConversionRule, EntryType, ExitType, Group, Location, Product,
    Supplier, Work,
};
use stockroom_core::{
    AddressingId, ConversionRuleId, EntryTypeId, ExitTypeId, GroupId, LocationId, MovementId,
    ProductId, SupplierId, WorkId,
};
use stockroom_ledger::{Movement, ProductRef};

use super::r#trait::{CasOutcome, DocumentStore, LedgerMaintenance, StoreError};

/// In-memory document store.
///
/// Intended for tests/dev. Mirrors the remote store's shape: one map per
/// catalog collection, one append-only vector of movements.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    products: RwLock<HashMap<ProductId, Product>>,
    movements: RwLock<Vec<Movement>>,
    suppliers: RwLock<HashMap<SupplierId, Supplier>>,
    conversion_rules: RwLock<HashMap<ConversionRuleId, ConversionRule>>,
    addressings: RwLock<HashMap<AddressingId, Addressing>>,
    locations: RwLock<HashMap<LocationId, Location>>,
    groups: RwLock<HashMap<GroupId, Group>>,
    entry_types: RwLock<HashMap<EntryTypeId, EntryType>>,
    exit_types: RwLock<HashMap<ExitTypeId, ExitType>>,
    works: RwLock<HashMap<WorkId, Work>>,
}

fn poisoned(_: impl std::fmt::Debug) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_product(&self, product: Product) {
        if let Ok(mut map) = self.products.write() {
            map.insert(product.id, product);
        }
    }

    pub fn upsert_supplier(&self, supplier: Supplier) {
        if let Ok(mut map) = self.suppliers.write() {
            map.insert(supplier.id, supplier);
        }
    }

    pub fn upsert_conversion_rule(&self, rule: ConversionRule) {
        if let Ok(mut map) = self.conversion_rules.write() {
            map.insert(rule.id, rule);
        }
    }

    pub fn upsert_addressing(&self, addressing: Addressing) {
        if let Ok(mut map) = self.addressings.write() {
            map.insert(addressing.id, addressing);
        }
    }

    pub fn upsert_location(&self, location: Location) {
        if let Ok(mut map) = self.locations.write() {
            map.insert(location.id, location);
        }
    }

    pub fn upsert_group(&self, group: Group) {
        if let Ok(mut map) = self.groups.write() {
            map.insert(group.id, group);
        }
    }

    pub fn upsert_entry_type(&self, entry_type: EntryType) {
        if let Ok(mut map) = self.entry_types.write() {
            map.insert(entry_type.id, entry_type);
        }
    }

    pub fn upsert_exit_type(&self, exit_type: ExitType) {
        if let Ok(mut map) = self.exit_types.write() {
            map.insert(exit_type.id, exit_type);
        }
    }

    pub fn upsert_work(&self, work: Work) {
        if let Ok(mut map) = self.works.write() {
            map.insert(work.id, work);
        }
    }

    pub fn list_groups(&self) -> Vec<Group> {
        self.groups.read().map(|m| m.values().cloned().collect()).unwrap_or_default()
    }

    pub fn list_entry_types(&self) -> Vec<EntryType> {
        self.entry_types.read().map(|m| m.values().cloned().collect()).unwrap_or_default()
    }

    pub fn list_exit_types(&self) -> Vec<ExitType> {
        self.exit_types.read().map(|m| m.values().cloned().collect()).unwrap_or_default()
    }

    pub fn list_works(&self) -> Vec<Work> {
        self.works.read().map(|m| m.values().cloned().collect()).unwrap_or_default()
    }

    /// Seed a raw movement document, bypassing the write path.
    ///
    /// For tests and fixtures that need legacy-shaped records (code-keyed
    /// references, string quantities) the service would never produce.
    pub fn seed_movement(&self, movement: Movement) {
        if let Ok(mut movements) = self.movements.write() {
            movements.push(movement);
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn catalog_snapshot(&self) -> Result<CatalogSnapshot, StoreError> {
        let products = self.products.read().map_err(poisoned)?;
        let suppliers = self.suppliers.read().map_err(poisoned)?;
        let rules = self.conversion_rules.read().map_err(poisoned)?;
        let addressings = self.addressings.read().map_err(poisoned)?;
        let locations = self.locations.read().map_err(poisoned)?;

        Ok(CatalogSnapshot::from_parts(
            products.values().cloned().collect(),
            suppliers.values().cloned().collect(),
            rules.values().cloned().collect(),
            addressings.values().cloned().collect(),
            locations.values().cloned().collect(),
        ))
    }

    async fn load_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(poisoned)?;
        Ok(products.get(&id).cloned())
    }

    async fn list_movements(
        &self,
        product_id: Option<ProductId>,
    ) -> Result<Vec<Movement>, StoreError> {
        let movements = self.movements.read().map_err(poisoned)?;
        Ok(match product_id {
            None => movements.clone(),
            Some(id) => {
                let key = id.to_string();
                movements
                    .iter()
                    .filter(|m| m.product_ref.as_str() == key)
                    .cloned()
                    .collect()
            }
        })
    }

    async fn append_with_balance(
        &self,
        movement: Movement,
        product_id: ProductId,
        expected_balance: f64,
        new_balance: f64,
    ) -> Result<MovementId, StoreError> {
        if movement.product_ref.as_str() != product_id.to_string() {
            return Err(StoreError::InvalidWrite(
                "movement reference does not match the product being updated".to_string(),
            ));
        }

        // Lock order: products before movements, everywhere.
        let mut products = self.products.write().map_err(poisoned)?;
        let mut movements = self.movements.write().map_err(poisoned)?;

        let product = products
            .get_mut(&product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))?;

        if product.cached_balance != expected_balance {
            return Err(StoreError::Contention(format!(
                "expected balance {expected_balance}, found {}",
                product.cached_balance
            )));
        }

        product.cached_balance = new_balance;
        let id = movement.id;
        movements.push(movement);
        Ok(id)
    }

    async fn compare_and_set_balance(
        &self,
        product_id: ProductId,
        expected: f64,
        new: f64,
    ) -> Result<CasOutcome, StoreError> {
        let mut products = self.products.write().map_err(poisoned)?;
        let product = products
            .get_mut(&product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))?;

        if product.cached_balance == expected {
            product.cached_balance = new;
            Ok(CasOutcome::Updated)
        } else {
            Ok(CasOutcome::Conflict {
                current: product.cached_balance,
            })
        }
    }
}

#[async_trait]
impl LedgerMaintenance for InMemoryDocumentStore {
    async fn rewrite_product_ref(
        &self,
        movement_id: MovementId,
        new_ref: ProductRef,
    ) -> Result<(), StoreError> {
        let mut movements = self.movements.write().map_err(poisoned)?;
        let movement = movements
            .iter_mut()
            .find(|m| m.id == movement_id)
            .ok_or_else(|| StoreError::NotFound(format!("movement {movement_id}")))?;
        movement.product_ref = new_ref;
        Ok(())
    }
}
