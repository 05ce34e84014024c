//! Key paths and their resolution against shapes and values.

use super::shape::Shape;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use storeplan_proto::Key;

/// Locates a key inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPath {
    /// Dotted path. The empty string selects the record itself.
    Single(String),
    /// Composite key: each path is resolved against the whole record.
    Composite(Vec<String>),
}

impl KeyPath {
    /// Path selecting the record value itself.
    pub fn identity() -> Self {
        KeyPath::Single(String::new())
    }

    /// Check if this is a composite key path.
    pub fn is_composite(&self) -> bool {
        matches!(self, KeyPath::Composite(_))
    }

    /// Iterate over the dotted paths this key path is made of.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        let paths: &[String] = match self {
            KeyPath::Single(path) => std::slice::from_ref(path),
            KeyPath::Composite(paths) => paths,
        };
        paths.iter().map(String::as_str)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPath::Single(path) => write!(f, "\"{path}\""),
            KeyPath::Composite(paths) => {
                write!(f, "[")?;
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{path}\"")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for KeyPath {
    fn from(path: &str) -> Self {
        KeyPath::Single(path.to_string())
    }
}

impl From<String> for KeyPath {
    fn from(path: String) -> Self {
        KeyPath::Single(path)
    }
}

impl From<Vec<&str>> for KeyPath {
    fn from(paths: Vec<&str>) -> Self {
        KeyPath::Composite(paths.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(paths: Vec<String>) -> Self {
        KeyPath::Composite(paths)
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(paths: [&str; N]) -> Self {
        KeyPath::Composite(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// The shape a single dotted path points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedField<'a> {
    /// Shape of the selected value.
    pub shape: &'a Shape,
    /// True if any field crossed on the way may be absent.
    pub optional: bool,
}

impl fmt::Display for ResolvedField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "{} | undefined", self.shape)
        } else {
            write!(f, "{}", self.shape)
        }
    }
}

/// Result of resolving a full key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A single dotted path.
    Single(ResolvedField<'a>),
    /// One entry per element of a composite path, in order.
    Composite(Vec<ResolvedField<'a>>),
}

impl<'a> Resolution<'a> {
    /// All resolved fields, one per path.
    pub fn fields(&self) -> &[ResolvedField<'a>] {
        match self {
            Resolution::Single(field) => std::slice::from_ref(field),
            Resolution::Composite(fields) => fields,
        }
    }
}

impl fmt::Display for Resolution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Single(field) => write!(f, "{field}"),
            Resolution::Composite(fields) => {
                write!(f, "[")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Resolve one dotted path against a shape.
///
/// Returns `None` if a segment is empty, missing, or descends into a
/// non-object.
pub fn resolve_path<'a>(shape: &'a Shape, path: &str) -> Option<ResolvedField<'a>> {
    let mut current = ResolvedField {
        shape,
        optional: false,
    };
    if path.is_empty() {
        return Some(current);
    }

    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        let field = current.shape.field(segment)?;
        current = ResolvedField {
            shape: &field.shape,
            optional: current.optional || field.optional,
        };
    }

    if current.shape == &Shape::Never {
        return None;
    }
    Some(current)
}

/// Resolve a key path against a shape.
///
/// Composite paths resolve element by element against the original shape;
/// the whole path is unresolvable if any element is, or if it is empty.
pub fn resolve<'a>(shape: &'a Shape, path: &KeyPath) -> Option<Resolution<'a>> {
    match path {
        KeyPath::Single(path) => resolve_path(shape, path).map(Resolution::Single),
        KeyPath::Composite(paths) if paths.is_empty() => None,
        KeyPath::Composite(paths) => paths
            .iter()
            .map(|path| resolve_path(shape, path))
            .collect::<Option<Vec<_>>>()
            .map(Resolution::Composite),
    }
}

/// Check that every path of a key path exists in the shape, whatever it
/// points to.
pub fn path_exists(shape: &Shape, path: &KeyPath) -> bool {
    resolve(shape, path).is_some()
}

fn select<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

fn to_key(value: &Value) -> Option<Key> {
    match value {
        Value::Number(n) => n.as_f64().map(Key::Number),
        Value::String(s) => Some(Key::String(s.clone())),
        Value::Array(items) => items.iter().map(to_key).collect::<Option<Vec<_>>>().map(Key::Array),
        _ => None,
    }
}

/// Extract the key a record value yields for `path`.
///
/// Returns `None` when a path is missing or selects something that is not
/// a key. Composite paths produce an array key.
pub fn evaluate(value: &Value, path: &KeyPath) -> Option<Key> {
    match path {
        KeyPath::Single(path) => select(value, path).and_then(to_key),
        KeyPath::Composite(paths) if paths.is_empty() => None,
        KeyPath::Composite(paths) => paths
            .iter()
            .map(|path| select(value, path).and_then(to_key))
            .collect::<Option<Vec<_>>>()
            .map(Key::Array),
    }
}

/// Extract the index entries a multi-entry index produces for a record.
///
/// An array yields one entry per distinct valid element; invalid elements
/// are skipped. Any other valid key yields a single entry.
pub fn evaluate_multi_entry(value: &Value, path: &str) -> Vec<Key> {
    match select(value, path) {
        Some(Value::Array(items)) => {
            let mut keys: Vec<Key> = Vec::with_capacity(items.len());
            for key in items.iter().filter_map(to_key) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            keys
        }
        Some(other) => to_key(other).into_iter().collect(),
        None => Vec::new(),
    }
}
