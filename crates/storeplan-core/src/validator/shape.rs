//! Shape rules: record transforms and in-place schema updates.

use super::keys::{check_key_stays_required, revalidate};
use super::Applied;
use crate::catalog::{SchemaModel, Shape};
use crate::error::{SchemaError, SchemaResult};
use crate::migration::{Action, Transform};

/// Replace a store's shape with a transform's output.
///
/// The primary key and every index must still validate against the new
/// shape, otherwise nothing changes.
pub fn transform_store(
    model: &SchemaModel,
    store: &str,
    transform: Transform,
) -> SchemaResult<Applied> {
    let descriptor = model
        .get_store(store)
        .ok_or_else(|| SchemaError::unknown_store(store))?;
    revalidate(store, descriptor, transform.output())?;

    let mut updated = descriptor.clone();
    updated.shape = transform.output().clone();

    Ok(Applied::with_action(
        model.with_store(store, updated),
        Action::TransformStore {
            store_name: store.to_string(),
            transform,
        },
    ))
}

/// Merge a shape change into a store without rewriting its records.
///
/// Produces no action. The merged shape goes through the same checks as a
/// transform, and a required primary key field cannot become optional even
/// on an auto-increment store.
pub fn update_schema(model: &SchemaModel, store: &str, delta: &Shape) -> SchemaResult<Applied> {
    let descriptor = model
        .get_store(store)
        .ok_or_else(|| SchemaError::unknown_store(store))?;
    let merged = descriptor.shape.merge(delta);
    revalidate(store, descriptor, &merged)?;
    check_key_stays_required(store, descriptor, &merged)?;

    let mut updated = descriptor.clone();
    updated.shape = merged;

    Ok(Applied::without_action(model.with_store(store, updated)))
}
