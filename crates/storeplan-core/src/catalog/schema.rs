//! Schema model - immutable snapshot of every store.

use super::key_path::KeyPath;
use super::store::{IndexDescriptor, StoreDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable snapshot of the schema at one point of a migration plan.
///
/// Updates return a new model; descriptors are shared between snapshots
/// through `Arc`, so an update only copies the store map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaModel {
    stores: BTreeMap<String, Arc<StoreDescriptor>>,
}

impl SchemaModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a store by name.
    pub fn get_store(&self, name: &str) -> Option<&StoreDescriptor> {
        self.stores.get(name).map(Arc::as_ref)
    }

    /// Check if a store exists.
    pub fn contains_store(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// List store names in order.
    pub fn store_names(&self) -> Vec<&str> {
        self.stores.keys().map(|s| s.as_str()).collect()
    }

    /// Iterate over stores in name order.
    pub fn stores(&self) -> impl Iterator<Item = (&str, &StoreDescriptor)> {
        self.stores.iter().map(|(name, store)| (name.as_str(), store.as_ref()))
    }

    /// Number of stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Check if the model has no stores.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// New model with `store` inserted (or replaced) under `name`.
    pub(crate) fn with_store(&self, name: impl Into<String>, store: StoreDescriptor) -> Self {
        let mut stores = self.stores.clone();
        stores.insert(name.into(), Arc::new(store));
        Self { stores }
    }

    /// New model without the store `name`.
    pub(crate) fn without_store(&self, name: &str) -> Self {
        let mut stores = self.stores.clone();
        stores.remove(name);
        Self { stores }
    }

    /// New model with the store `old` moved to `new`, descriptor untouched.
    pub(crate) fn with_renamed_store(&self, old: &str, new: impl Into<String>) -> Self {
        let mut stores = self.stores.clone();
        if let Some(store) = stores.remove(old) {
            stores.insert(new.into(), store);
        }
        Self { stores }
    }

    /// Structural layout of the model, without record shapes.
    pub fn layout(&self) -> SchemaLayout {
        SchemaLayout {
            stores: self
                .stores
                .iter()
                .map(|(name, store)| (name.clone(), StoreLayout::from(store.as_ref())))
                .collect(),
        }
    }
}

/// What a storage engine sees of a store: keys and indexes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreLayout {
    /// Primary key path.
    pub key_path: Option<KeyPath>,
    /// Keys are generated by the engine.
    pub auto_increment: bool,
    /// Indexes keyed by name.
    pub indexes: BTreeMap<String, IndexDescriptor>,
}

impl From<&StoreDescriptor> for StoreLayout {
    fn from(store: &StoreDescriptor) -> Self {
        Self {
            key_path: store.key_path.clone(),
            auto_increment: store.auto_increment,
            indexes: store.indexes.clone(),
        }
    }
}

/// What a storage engine sees of a whole schema.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaLayout {
    /// Store layouts keyed by name.
    pub stores: BTreeMap<String, StoreLayout>,
}

impl SchemaLayout {
    /// Get a store layout by name.
    pub fn get_store(&self, name: &str) -> Option<&StoreLayout> {
        self.stores.get(name)
    }
}
