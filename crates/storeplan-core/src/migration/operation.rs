//! Structural operations accepted by the validator.

use super::action::Transform;
use crate::catalog::{IndexDef, Shape, StoreDef};

/// Kind of a schema operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateStore,
    DeleteStore,
    RenameStore,
    CreateIndex,
    DeleteIndex,
    RenameIndex,
    TransformStore,
    UpdateSchema,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationKind::CreateStore => "create-store",
            OperationKind::DeleteStore => "delete-store",
            OperationKind::RenameStore => "rename-store",
            OperationKind::CreateIndex => "create-index",
            OperationKind::DeleteIndex => "delete-index",
            OperationKind::RenameIndex => "rename-index",
            OperationKind::TransformStore => "transform-store",
            OperationKind::UpdateSchema => "update-schema",
        };
        write!(f, "{}", name)
    }
}

/// A proposed structural change to the schema.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Create a store.
    CreateStore(StoreDef),
    /// Delete a store.
    DeleteStore { name: String },
    /// Rename a store.
    RenameStore { old_name: String, new_name: String },
    /// Create an index on a store.
    CreateIndex { store: String, index: IndexDef },
    /// Delete an index.
    DeleteIndex { store: String, index: String },
    /// Rename an index.
    RenameIndex {
        store: String,
        old_name: String,
        new_name: String,
    },
    /// Rewrite every record of a store into a new shape.
    TransformStore { store: String, transform: Transform },
    /// Deep-merge a shape change into a store, without touching records.
    UpdateSchema { store: String, delta: Shape },
}

impl Operation {
    /// Get the kind of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CreateStore(_) => OperationKind::CreateStore,
            Operation::DeleteStore { .. } => OperationKind::DeleteStore,
            Operation::RenameStore { .. } => OperationKind::RenameStore,
            Operation::CreateIndex { .. } => OperationKind::CreateIndex,
            Operation::DeleteIndex { .. } => OperationKind::DeleteIndex,
            Operation::RenameIndex { .. } => OperationKind::RenameIndex,
            Operation::TransformStore { .. } => OperationKind::TransformStore,
            Operation::UpdateSchema { .. } => OperationKind::UpdateSchema,
        }
    }

    /// Get the store this operation targets (the old name for renames).
    pub fn store_name(&self) -> &str {
        match self {
            Operation::CreateStore(def) => &def.name,
            Operation::DeleteStore { name } => name,
            Operation::RenameStore { old_name, .. } => old_name,
            Operation::CreateIndex { store, .. }
            | Operation::DeleteIndex { store, .. }
            | Operation::RenameIndex { store, .. }
            | Operation::TransformStore { store, .. }
            | Operation::UpdateSchema { store, .. } => store,
        }
    }
}
