//! Actions handed to a storage executor.

use crate::catalog::{IndexDescriptor, KeyPath, SchemaLayout, Shape, StoreLayout};
use crate::error::SchemaError;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

type TransformFn = dyn Fn(Value) -> Value + Send + Sync;

/// Opaque handle to a record transformation.
///
/// The planner only looks at the declared output shape; the function is run
/// by the executor over every stored record.
#[derive(Clone)]
pub struct Transform {
    output: Shape,
    func: Arc<TransformFn>,
}

impl Transform {
    /// Create a transform producing records of shape `output`.
    pub fn new<F>(output: impl Into<Shape>, func: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            output: output.into(),
            func: Arc::new(func),
        }
    }

    /// Declared output shape.
    pub fn output(&self) -> &Shape {
        &self.output
    }

    /// Run the transform on one record.
    pub fn apply(&self, value: Value) -> Value {
        (self.func)(value)
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl Serialize for Transform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Transform", 1)?;
        state.serialize_field("output", &self.output)?;
        state.end()
    }
}

/// One structural change for the executor to apply.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Action {
    /// Create a store.
    CreateStore {
        store_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        key_path: Option<KeyPath>,
        auto_increment: bool,
    },
    /// Delete a store and all its records.
    DeleteStore { store_name: String },
    /// Rename a store.
    RenameStore { old_name: String, new_name: String },
    /// Create an index.
    CreateIndex {
        store_name: String,
        index_name: String,
        key_path: KeyPath,
        multi_entry: bool,
        unique: bool,
    },
    /// Delete an index.
    DeleteIndex {
        store_name: String,
        index_name: String,
    },
    /// Rename an index.
    RenameIndex {
        store_name: String,
        old_index_name: String,
        new_index_name: String,
    },
    /// Rewrite every record of a store.
    TransformStore {
        store_name: String,
        transform: Transform,
    },
}

impl Action {
    /// Get a description of this action.
    pub fn description(&self) -> String {
        match self {
            Action::CreateStore { store_name, .. } => format!("Create store '{}'", store_name),
            Action::DeleteStore { store_name } => format!("Delete store '{}'", store_name),
            Action::RenameStore { old_name, new_name } => {
                format!("Rename store '{}' to '{}'", old_name, new_name)
            }
            Action::CreateIndex {
                store_name,
                index_name,
                ..
            } => format!("Create index '{}.{}'", store_name, index_name),
            Action::DeleteIndex {
                store_name,
                index_name,
            } => format!("Delete index '{}.{}'", store_name, index_name),
            Action::RenameIndex {
                store_name,
                old_index_name,
                new_index_name,
            } => format!(
                "Rename index '{}.{}' to '{}.{}'",
                store_name, old_index_name, store_name, new_index_name
            ),
            Action::TransformStore { store_name, .. } => {
                format!("Transform records of '{}'", store_name)
            }
        }
    }

    /// Get the store this action targets (the old name for renames).
    pub fn store_name(&self) -> &str {
        match self {
            Action::CreateStore { store_name, .. } => store_name,
            Action::DeleteStore { store_name } => store_name,
            Action::RenameStore { old_name, .. } => old_name,
            Action::CreateIndex { store_name, .. } => store_name,
            Action::DeleteIndex { store_name, .. } => store_name,
            Action::RenameIndex { store_name, .. } => store_name,
            Action::TransformStore { store_name, .. } => store_name,
        }
    }

    /// Apply this action to a structural layout, as an executor would.
    ///
    /// Fails when the action references a store or index that the layout
    /// does not have, or creates one that it already has.
    pub fn apply_to_layout(&self, layout: &mut SchemaLayout) -> Result<(), SchemaError> {
        match self {
            Action::CreateStore {
                store_name,
                key_path,
                auto_increment,
            } => {
                if layout.stores.contains_key(store_name) {
                    return Err(SchemaError::duplicate_store(store_name));
                }
                layout.stores.insert(
                    store_name.clone(),
                    StoreLayout {
                        key_path: key_path.clone(),
                        auto_increment: *auto_increment,
                        indexes: Default::default(),
                    },
                );
            }
            Action::DeleteStore { store_name } => {
                layout
                    .stores
                    .remove(store_name)
                    .ok_or_else(|| SchemaError::unknown_store(store_name))?;
            }
            Action::RenameStore { old_name, new_name } => {
                if layout.stores.contains_key(new_name) {
                    return Err(SchemaError::duplicate_store(new_name));
                }
                let store = layout
                    .stores
                    .remove(old_name)
                    .ok_or_else(|| SchemaError::unknown_store(old_name))?;
                layout.stores.insert(new_name.clone(), store);
            }
            Action::CreateIndex {
                store_name,
                index_name,
                key_path,
                multi_entry,
                unique,
            } => {
                let store = store_layout(layout, store_name)?;
                if store.indexes.contains_key(index_name) {
                    return Err(SchemaError::duplicate_index(store_name, index_name));
                }
                store.indexes.insert(
                    index_name.clone(),
                    IndexDescriptor {
                        key_path: key_path.clone(),
                        multi_entry: *multi_entry,
                        unique: *unique,
                    },
                );
            }
            Action::DeleteIndex {
                store_name,
                index_name,
            } => {
                store_layout(layout, store_name)?
                    .indexes
                    .remove(index_name)
                    .ok_or_else(|| SchemaError::unknown_index(store_name, index_name))?;
            }
            Action::RenameIndex {
                store_name,
                old_index_name,
                new_index_name,
            } => {
                let store = store_layout(layout, store_name)?;
                if store.indexes.contains_key(new_index_name) {
                    return Err(SchemaError::duplicate_index(store_name, new_index_name));
                }
                let index = store
                    .indexes
                    .remove(old_index_name)
                    .ok_or_else(|| SchemaError::unknown_index(store_name, old_index_name))?;
                store.indexes.insert(new_index_name.clone(), index);
            }
            Action::TransformStore { store_name, .. } => {
                store_layout(layout, store_name)?;
            }
        }
        Ok(())
    }
}

fn store_layout<'a>(
    layout: &'a mut SchemaLayout,
    store_name: &str,
) -> Result<&'a mut StoreLayout, SchemaError> {
    layout
        .stores
        .get_mut(store_name)
        .ok_or_else(|| SchemaError::unknown_store(store_name))
}
