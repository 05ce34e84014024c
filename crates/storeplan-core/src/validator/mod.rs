//! Schema operation rules.
//!
//! Every rule is a pure function from the current [`SchemaModel`] and one
//! operation to either a new model plus the action to emit, or a rejection.
//! The input model is never modified.

mod index;
mod keys;
mod shape;
mod store;

pub use index::{create_index, delete_index, rename_index};
pub use keys::{check_index, check_primary_key, KeyRule};
pub use shape::{transform_store, update_schema};
pub use store::{create_store, delete_store, rename_store};

use crate::catalog::SchemaModel;
use crate::config::PlanConfig;
use crate::error::SchemaResult;
use crate::migration::{Action, Operation};

/// Outcome of an accepted operation.
#[derive(Debug, Clone)]
pub struct Applied {
    /// Model after the operation.
    pub model: SchemaModel,
    /// Action for the executor, if the operation produces one.
    pub action: Option<Action>,
}

impl Applied {
    pub(crate) fn with_action(model: SchemaModel, action: Action) -> Self {
        Self {
            model,
            action: Some(action),
        }
    }

    pub(crate) fn without_action(model: SchemaModel) -> Self {
        Self {
            model,
            action: None,
        }
    }
}

/// Validate and apply one operation.
pub fn apply(
    model: &SchemaModel,
    operation: Operation,
    config: &PlanConfig,
) -> SchemaResult<Applied> {
    match operation {
        Operation::CreateStore(def) => create_store(model, def),
        Operation::DeleteStore { name } => delete_store(model, &name),
        Operation::RenameStore { old_name, new_name } => {
            rename_store(model, &old_name, &new_name, config.same_name_rename)
        }
        Operation::CreateIndex { store, index } => create_index(model, &store, index),
        Operation::DeleteIndex { store, index } => delete_index(model, &store, &index),
        Operation::RenameIndex {
            store,
            old_name,
            new_name,
        } => rename_index(model, &store, &old_name, &new_name, config.same_name_rename),
        Operation::TransformStore { store, transform } => transform_store(model, &store, transform),
        Operation::UpdateSchema { store, delta } => update_schema(model, &store, &delta),
    }
}
