//! Record shape descriptors.
//!
//! A [`Shape`] is the structural description of a stored value. The planner
//! never checks values against it; it only resolves key paths through it and
//! re-resolves them whenever a store's shape changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fields of an object shape, keyed by name.
pub type Fields = BTreeMap<String, Field>;

/// Structural description of a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    /// UTF-8 string.
    String,
    /// Number (integer or floating point).
    Number,
    /// Point in time.
    Date,
    /// Binary buffer.
    Binary,
    /// Boolean.
    Boolean,
    /// Null.
    Null,
    /// Homogeneous array.
    Array {
        /// Element shape.
        items: Box<Shape>,
    },
    /// Object with named fields.
    Object {
        /// Field definitions.
        fields: Fields,
    },
    /// No value at all. Inside a schema update it removes the field.
    Never,
}

/// A field within an object shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field value shape.
    pub shape: Shape,
    /// Whether the field may be absent.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl Field {
    /// Create a field that is always present.
    pub fn required(shape: Shape) -> Self {
        Self {
            shape,
            optional: false,
        }
    }

    /// Create a field that may be absent.
    pub fn optional(shape: Shape) -> Self {
        Self {
            shape,
            optional: true,
        }
    }
}

impl Shape {
    /// Create an array shape.
    pub fn array(items: Shape) -> Self {
        Shape::Array {
            items: Box::new(items),
        }
    }

    /// Start building an object shape.
    pub fn object() -> ObjectShape {
        ObjectShape::default()
    }

    /// Check if values of this shape are valid keys.
    ///
    /// Strings, numbers, dates, binary buffers, and arrays of valid keys are.
    pub fn is_valid_key(&self) -> bool {
        match self {
            Shape::String | Shape::Number | Shape::Date | Shape::Binary => true,
            Shape::Array { items } => items.is_valid_key(),
            _ => false,
        }
    }

    /// Check if this shape is a number.
    pub fn is_number(&self) -> bool {
        matches!(self, Shape::Number)
    }

    /// Check if this shape is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, Shape::Object { .. })
    }

    /// Get the fields if this is an object shape.
    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Shape::Object { fields } => Some(fields),
            _ => None,
        }
    }

    /// Get a field by name if this is an object shape.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().and_then(|fields| fields.get(name))
    }

    /// Get the element shape if this is an array shape.
    pub fn array_items(&self) -> Option<&Shape> {
        match self {
            Shape::Array { items } => Some(items),
            _ => None,
        }
    }

    /// Deep-merge `delta` into this shape.
    ///
    /// Object fields merge recursively, a [`Shape::Never`] field removes
    /// the existing one, and any other field in the delta replaces it. An
    /// object delta over a non-object merges into an empty object, so no
    /// removal marker survives in the result. A non-object delta replaces
    /// the whole shape.
    pub fn merge(&self, delta: &Shape) -> Shape {
        let Shape::Object { fields: changes } = delta else {
            return delta.clone();
        };

        let mut merged = self.fields().cloned().unwrap_or_default();
        for (name, change) in changes {
            if change.shape == Shape::Never {
                merged.remove(name);
                continue;
            }

            let shape = match merged.get(name) {
                Some(existing) => existing.shape.merge(&change.shape),
                None => Shape::Never.merge(&change.shape),
            };
            merged.insert(
                name.clone(),
                Field {
                    shape,
                    optional: change.optional,
                },
            );
        }

        Shape::Object { fields: merged }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::String => write!(f, "string"),
            Shape::Number => write!(f, "number"),
            Shape::Date => write!(f, "Date"),
            Shape::Binary => write!(f, "binary"),
            Shape::Boolean => write!(f, "boolean"),
            Shape::Null => write!(f, "null"),
            Shape::Never => write!(f, "never"),
            Shape::Array { items } => write!(f, "{items}[]"),
            Shape::Object { fields } if fields.is_empty() => write!(f, "{{}}"),
            Shape::Object { fields } => {
                write!(f, "{{ ")?;
                for (i, (name, field)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    let marker = if field.optional { "?" } else { "" };
                    write!(f, "{name}{marker}: {}", field.shape)?;
                }
                write!(f, " }}")
            }
        }
    }
}

/// Builder for object shapes.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    fields: Fields,
}

impl ObjectShape {
    /// Add a field that is always present.
    pub fn with_field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.insert(name.into(), Field::required(shape));
        self
    }

    /// Add a field that may be absent.
    pub fn with_optional(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.insert(name.into(), Field::optional(shape));
        self
    }

    /// Mark a field for removal (schema updates only).
    pub fn without(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), Field::required(Shape::Never));
        self
    }

    /// Finish the object shape.
    pub fn build(self) -> Shape {
        Shape::Object {
            fields: self.fields,
        }
    }
}

impl From<ObjectShape> for Shape {
    fn from(object: ObjectShape) -> Self {
        object.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_shape() -> Shape {
        Shape::object()
            .with_field("id", Shape::String)
            .with_optional("nickname", Shape::String)
            .with_field(
                "address",
                Shape::object()
                    .with_field("city", Shape::String)
                    .with_field("zip", Shape::Number)
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_valid_key_shapes() {
        assert!(Shape::String.is_valid_key());
        assert!(Shape::Number.is_valid_key());
        assert!(Shape::Date.is_valid_key());
        assert!(Shape::Binary.is_valid_key());
        assert!(Shape::array(Shape::array(Shape::Number)).is_valid_key());

        assert!(!Shape::Boolean.is_valid_key());
        assert!(!Shape::Null.is_valid_key());
        assert!(!Shape::array(Shape::Boolean).is_valid_key());
        assert!(!user_shape().is_valid_key());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::array(Shape::String).to_string(), "string[]");
        assert_eq!(Shape::object().build().to_string(), "{}");
        assert_eq!(
            Shape::object()
                .with_field("id", Shape::Number)
                .with_optional("tags", Shape::array(Shape::String))
                .build()
                .to_string(),
            "{ id: number, tags?: string[] }"
        );
    }

    #[test]
    fn test_merge_nested_fields() {
        let delta = Shape::object()
            .with_field(
                "address",
                Shape::object().with_field("country", Shape::String).build(),
            )
            .build();

        let merged = user_shape().merge(&delta);
        let address = merged.field("address").unwrap();

        assert!(address.shape.field("city").is_some());
        assert!(address.shape.field("zip").is_some());
        assert!(address.shape.field("country").is_some());
        assert!(merged.field("id").is_some());
    }

    #[test]
    fn test_merge_replaces_and_removes() {
        let delta = Shape::object()
            .with_field("address", Shape::String)
            .with_optional("id", Shape::String)
            .without("nickname")
            .build();

        let merged = user_shape().merge(&delta);

        assert_eq!(merged.field("address").unwrap().shape, Shape::String);
        assert!(merged.field("id").unwrap().optional);
        assert!(merged.field("nickname").is_none());
    }

    #[test]
    fn test_merge_drops_removal_markers_in_new_objects() {
        let delta = Shape::object()
            .with_field("id", Shape::object().with_field("raw", Shape::String).build())
            .with_field(
                "profile",
                Shape::object()
                    .with_field("bio", Shape::String)
                    .without("avatar")
                    .build(),
            )
            .build();

        let merged = user_shape().merge(&delta);
        let profile = &merged.field("profile").unwrap().shape;

        assert_eq!(profile, &Shape::object().with_field("bio", Shape::String).build());
        assert_eq!(
            merged.field("id").unwrap().shape,
            Shape::object().with_field("raw", Shape::String).build()
        );
        assert!(!merged.to_string().contains("never"));
        assert_eq!(
            Shape::String.merge(&Shape::object().without("x").build()),
            Shape::object().build()
        );
    }

    #[test]
    fn test_merge_non_object_replaces() {
        assert_eq!(Shape::String.merge(&user_shape()), user_shape());
        assert_eq!(user_shape().merge(&Shape::Number), Shape::Number);
    }

    #[test]
    fn test_shape_json() {
        let shape: Shape = serde_json::from_value(serde_json::json!({
            "type": "object",
            "fields": {
                "id": {"shape": {"type": "number"}},
                "tags": {"shape": {"type": "array", "items": {"type": "string"}}, "optional": true}
            }
        }))
        .unwrap();

        assert_eq!(
            shape,
            Shape::object()
                .with_field("id", Shape::Number)
                .with_optional("tags", Shape::array(Shape::String))
                .build()
        );
    }
}
