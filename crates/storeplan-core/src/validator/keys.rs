//! Key path predicates shared by the store, index, and shape rules.

use crate::catalog::{resolve, resolve_path, IndexDescriptor, KeyPath, Shape, StoreDescriptor};
use crate::error::{KeyViolation, SchemaError};

/// Which primary-key rule a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRule {
    /// The path must resolve to an always-present valid key.
    PrimaryKey,
    /// Generated keys are scalar numbers.
    AutoIncrement,
}

/// Strict resolution: every path must exist and select a valid key.
fn check_strict(shape: &Shape, path: &KeyPath, allow_optional: bool) -> Result<(), KeyViolation> {
    if matches!(path, KeyPath::Composite(paths) if paths.is_empty()) {
        return Err(KeyViolation::EmptyComposite);
    }

    let resolution = resolve(shape, path).ok_or(KeyViolation::Unresolvable)?;
    if resolution.fields().iter().any(|f| !f.shape.is_valid_key()) {
        return Err(KeyViolation::NotAKey {
            resolved: resolution.to_string(),
        });
    }
    if !allow_optional && resolution.fields().iter().any(|f| f.optional) {
        return Err(KeyViolation::Optional {
            resolved: resolution.to_string(),
        });
    }
    Ok(())
}

/// Check a primary key path against a shape.
///
/// Without auto-increment the path must resolve to valid keys that are
/// always present. With auto-increment it must be a single non-empty path
/// to a number, which may be absent until the engine assigns it.
pub fn check_primary_key(
    shape: &Shape,
    path: &KeyPath,
    auto_increment: bool,
) -> Result<(), (KeyRule, KeyViolation)> {
    if !auto_increment {
        return check_strict(shape, path, false).map_err(|v| (KeyRule::PrimaryKey, v));
    }

    let KeyPath::Single(single) = path else {
        return Err((KeyRule::AutoIncrement, KeyViolation::CompositeAutoIncrement));
    };
    if single.is_empty() {
        return Err((KeyRule::AutoIncrement, KeyViolation::EmptyAutoIncrement));
    }
    let field = resolve_path(shape, single).ok_or((KeyRule::PrimaryKey, KeyViolation::Unresolvable))?;
    if field.shape.is_number() {
        Ok(())
    } else {
        Err((
            KeyRule::AutoIncrement,
            KeyViolation::NotNumber {
                resolved: field.to_string(),
            },
        ))
    }
}

/// Check an index key path against a shape.
///
/// Plain indexes resolve strictly, but may cross optional fields: records
/// without the value are simply not indexed. Multi-entry indexes take a
/// single path to a valid key or to an array of valid keys.
pub fn check_index(shape: &Shape, index: &IndexDescriptor) -> Result<(), KeyViolation> {
    if !index.multi_entry {
        return check_strict(shape, &index.key_path, true);
    }

    let KeyPath::Single(path) = &index.key_path else {
        return Err(KeyViolation::CompositeMultiEntry);
    };
    let field = resolve_path(shape, path).ok_or(KeyViolation::Unresolvable)?;
    if field.shape.is_valid_key() {
        return Ok(());
    }

    let resolved = field.to_string();
    match field.shape.array_items() {
        Some(_) => Err(KeyViolation::InvalidElements { resolved }),
        None => Err(KeyViolation::NotKeyOrArray { resolved }),
    }
}

/// Re-check a store's primary key and indexes against a replacement shape.
///
/// Indexes are checked in name order; the first failure is reported.
pub(crate) fn revalidate(
    store_name: &str,
    store: &StoreDescriptor,
    shape: &Shape,
) -> Result<(), SchemaError> {
    if let Some(path) = &store.key_path {
        check_primary_key(shape, path, store.auto_increment).map_err(|(_, violation)| {
            SchemaError::TransformInvalidatesKey {
                store: store_name.to_string(),
                path: path.clone(),
                violation,
            }
        })?;
    }

    for (name, index) in &store.indexes {
        check_index(shape, index).map_err(|violation| SchemaError::TransformInvalidatesIndex {
            store: store_name.to_string(),
            index: name.clone(),
            path: index.key_path.clone(),
            violation,
        })?;
    }

    Ok(())
}

/// Reject a shape change that turns a required primary key field optional.
///
/// Applies to auto-increment stores too: a key created optional may stay
/// optional, but a required one cannot be relaxed.
pub(crate) fn check_key_stays_required(
    store_name: &str,
    store: &StoreDescriptor,
    shape: &Shape,
) -> Result<(), SchemaError> {
    let Some(path) = &store.key_path else {
        return Ok(());
    };

    for single in path.paths() {
        let (Some(before), Some(after)) = (
            resolve_path(&store.shape, single),
            resolve_path(shape, single),
        ) else {
            continue;
        };
        if !before.optional && after.optional {
            return Err(SchemaError::TransformInvalidatesKey {
                store: store_name.to_string(),
                path: path.clone(),
                violation: KeyViolation::Optional {
                    resolved: after.to_string(),
                },
            });
        }
    }

    Ok(())
}
