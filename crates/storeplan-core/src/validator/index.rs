//! Index rules: create, delete, rename.

use super::keys::check_index;
use super::Applied;
use crate::catalog::{IndexDef, SchemaModel, StoreDescriptor};
use crate::config::SameNameRename;
use crate::error::{KeyViolation, SchemaError, SchemaResult};
use crate::migration::Action;

fn existing<'a>(model: &'a SchemaModel, store: &str) -> SchemaResult<&'a StoreDescriptor> {
    model
        .get_store(store)
        .ok_or_else(|| SchemaError::unknown_store(store))
}

/// Create an index on an existing store.
pub fn create_index(model: &SchemaModel, store: &str, def: IndexDef) -> SchemaResult<Applied> {
    let descriptor = existing(model, store)?;
    if descriptor.has_index(&def.name) {
        return Err(SchemaError::duplicate_index(store, &def.name));
    }

    let (name, index) = def.into_parts();
    check_index(&descriptor.shape, &index).map_err(|violation| match violation {
        KeyViolation::CompositeMultiEntry
        | KeyViolation::InvalidElements { .. }
        | KeyViolation::NotKeyOrArray { .. } => SchemaError::MultiEntryConstraint {
            store: store.to_string(),
            index: name.clone(),
            path: index.key_path.clone(),
            violation,
        },
        violation => SchemaError::InvalidKeyPath {
            store: store.to_string(),
            index: Some(name.clone()),
            path: index.key_path.clone(),
            violation,
        },
    })?;

    let action = Action::CreateIndex {
        store_name: store.to_string(),
        index_name: name.clone(),
        key_path: index.key_path.clone(),
        multi_entry: index.multi_entry,
        unique: index.unique,
    };
    let mut updated = descriptor.clone();
    updated.indexes.insert(name, index);

    Ok(Applied::with_action(model.with_store(store, updated), action))
}

/// Delete an index.
pub fn delete_index(model: &SchemaModel, store: &str, name: &str) -> SchemaResult<Applied> {
    let descriptor = existing(model, store)?;
    if !descriptor.has_index(name) {
        return Err(SchemaError::unknown_index(store, name));
    }

    let mut updated = descriptor.clone();
    updated.indexes.remove(name);

    Ok(Applied::with_action(
        model.with_store(store, updated),
        Action::DeleteIndex {
            store_name: store.to_string(),
            index_name: name.to_string(),
        },
    ))
}

/// Rename an index within its store.
pub fn rename_index(
    model: &SchemaModel,
    store: &str,
    old_name: &str,
    new_name: &str,
    same_name: SameNameRename,
) -> SchemaResult<Applied> {
    let descriptor = existing(model, store)?;
    if !descriptor.has_index(old_name) {
        return Err(SchemaError::unknown_index(store, old_name));
    }
    if old_name == new_name {
        return match same_name {
            SameNameRename::NoOp => Ok(Applied::without_action(model.clone())),
            SameNameRename::Reject => Err(SchemaError::duplicate_index(store, new_name)),
        };
    }
    if descriptor.has_index(new_name) {
        return Err(SchemaError::duplicate_index(store, new_name));
    }

    let mut updated = descriptor.clone();
    if let Some(index) = updated.indexes.remove(old_name) {
        updated.indexes.insert(new_name.to_string(), index);
    }

    Ok(Applied::with_action(
        model.with_store(store, updated),
        Action::RenameIndex {
            store_name: store.to_string(),
            old_index_name: old_name.to_string(),
            new_index_name: new_name.to_string(),
        },
    ))
}
