//! Store rules: create, delete, rename.

use super::keys::{check_primary_key, KeyRule};
use super::Applied;
use crate::catalog::{SchemaModel, StoreDef, StoreDescriptor};
use crate::config::SameNameRename;
use crate::error::{SchemaError, SchemaResult};
use crate::migration::Action;
use std::collections::BTreeMap;

/// Create a store.
pub fn create_store(model: &SchemaModel, def: StoreDef) -> SchemaResult<Applied> {
    if model.contains_store(&def.name) {
        return Err(SchemaError::duplicate_store(&def.name));
    }

    if let Some(path) = &def.key_path {
        check_primary_key(&def.shape, path, def.auto_increment).map_err(|(rule, violation)| {
            match rule {
                KeyRule::PrimaryKey => SchemaError::InvalidKeyPath {
                    store: def.name.clone(),
                    index: None,
                    path: path.clone(),
                    violation,
                },
                KeyRule::AutoIncrement => SchemaError::AutoIncrementConstraint {
                    store: def.name.clone(),
                    path: path.clone(),
                    violation,
                },
            }
        })?;
    }

    let action = Action::CreateStore {
        store_name: def.name.clone(),
        key_path: def.key_path.clone(),
        auto_increment: def.auto_increment,
    };
    let descriptor = StoreDescriptor {
        shape: def.shape,
        key_path: def.key_path,
        auto_increment: def.auto_increment,
        indexes: BTreeMap::new(),
    };

    Ok(Applied::with_action(
        model.with_store(def.name, descriptor),
        action,
    ))
}

/// Delete a store. Its name becomes available again right away.
pub fn delete_store(model: &SchemaModel, name: &str) -> SchemaResult<Applied> {
    if !model.contains_store(name) {
        return Err(SchemaError::unknown_store(name));
    }

    Ok(Applied::with_action(
        model.without_store(name),
        Action::DeleteStore {
            store_name: name.to_string(),
        },
    ))
}

/// Rename a store, keeping its shape, keys, and indexes.
pub fn rename_store(
    model: &SchemaModel,
    old_name: &str,
    new_name: &str,
    same_name: SameNameRename,
) -> SchemaResult<Applied> {
    if !model.contains_store(old_name) {
        return Err(SchemaError::unknown_store(old_name));
    }
    if old_name == new_name {
        return match same_name {
            SameNameRename::NoOp => Ok(Applied::without_action(model.clone())),
            SameNameRename::Reject => Err(SchemaError::duplicate_store(new_name)),
        };
    }
    if model.contains_store(new_name) {
        return Err(SchemaError::duplicate_store(new_name));
    }

    Ok(Applied::with_action(
        model.with_renamed_store(old_name, new_name),
        Action::RenameStore {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        },
    ))
}
