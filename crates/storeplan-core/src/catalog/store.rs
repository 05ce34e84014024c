//! Store and index definitions.

use super::key_path::KeyPath;
use super::shape::Shape;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An index on a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Where the indexed value lives in each record.
    pub key_path: KeyPath,
    /// One index entry per array element.
    #[serde(default)]
    pub multi_entry: bool,
    /// Reject records whose indexed value is already present.
    #[serde(default)]
    pub unique: bool,
}

/// A store as tracked by the schema model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDescriptor {
    /// Shape of stored values.
    pub shape: Shape,
    /// Primary key path. `None` means keys are supplied out of line.
    pub key_path: Option<KeyPath>,
    /// Keys are generated by the engine.
    pub auto_increment: bool,
    /// Indexes keyed by name.
    pub indexes: BTreeMap<String, IndexDescriptor>,
}

impl StoreDescriptor {
    /// Get an index by name.
    pub fn get_index(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indexes.get(name)
    }

    /// Check if an index exists.
    pub fn has_index(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// List index names in order.
    pub fn index_names(&self) -> Vec<&str> {
        self.indexes.keys().map(|s| s.as_str()).collect()
    }

    /// Check if keys are stored inside the record.
    pub fn uses_inline_keys(&self) -> bool {
        self.key_path.is_some()
    }
}

/// Arguments for creating a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreDef {
    /// Store name (unique within the schema).
    pub name: String,
    /// Shape of stored values.
    pub shape: Shape,
    /// Primary key path.
    pub key_path: Option<KeyPath>,
    /// Keys are generated by the engine.
    pub auto_increment: bool,
}

impl StoreDef {
    /// Create a store definition with out-of-line keys.
    pub fn new(name: impl Into<String>, shape: impl Into<Shape>) -> Self {
        Self {
            name: name.into(),
            shape: shape.into(),
            key_path: None,
            auto_increment: false,
        }
    }

    /// Set the primary key path.
    pub fn with_key_path(mut self, key_path: impl Into<KeyPath>) -> Self {
        self.key_path = Some(key_path.into());
        self
    }

    /// Let the engine generate keys.
    pub fn with_auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// Arguments for creating an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDef {
    /// Index name (unique within its store).
    pub name: String,
    /// Where the indexed value lives.
    pub key_path: KeyPath,
    /// One index entry per array element.
    pub multi_entry: bool,
    /// Indexed values must be unique.
    pub unique: bool,
}

impl IndexDef {
    /// Create a plain index definition.
    pub fn new(name: impl Into<String>, key_path: impl Into<KeyPath>) -> Self {
        Self {
            name: name.into(),
            key_path: key_path.into(),
            multi_entry: false,
            unique: false,
        }
    }

    /// Mark as multi-entry.
    pub fn with_multi_entry(mut self) -> Self {
        self.multi_entry = true;
        self
    }

    /// Mark as unique.
    pub fn with_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Split into name and descriptor.
    pub fn into_parts(self) -> (String, IndexDescriptor) {
        (
            self.name,
            IndexDescriptor {
                key_path: self.key_path,
                multi_entry: self.multi_entry,
                unique: self.unique,
            },
        )
    }
}
