//! Native key values.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A key value as the storage engine orders it.
///
/// Keys of different types never compare equal. Across types the order is
/// number < date < string < binary < array; arrays compare element by element
/// and a shorter array sorts first when it is a prefix of the longer one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Key {
    /// Numeric key.
    Number(f64),
    /// Date as milliseconds since the Unix epoch.
    Date(i64),
    /// UTF-8 string key.
    String(String),
    /// Binary buffer key.
    Binary(Vec<u8>),
    /// Array of keys.
    Array(Vec<Key>),
}

impl Key {
    /// Create an array key.
    pub fn array(keys: impl IntoIterator<Item = Key>) -> Self {
        Key::Array(keys.into_iter().collect())
    }

    fn type_rank(&self) -> u8 {
        match self {
            Key::Number(_) => 0,
            Key::Date(_) => 1,
            Key::String(_) => 2,
            Key::Binary(_) => 3,
            Key::Array(_) => 4,
        }
    }

    /// Check that the engine can order this key.
    ///
    /// `NaN` is not a valid key, neither at the top level nor inside an array.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Key::Number(n) if n.is_nan() => Err(Error::InvalidKey("NaN is not a valid key".into())),
            Key::Array(items) => items.iter().try_for_each(Key::validate),
            _ => Ok(()),
        }
    }

    /// Check if this key is valid.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check if this key is an array key.
    pub fn is_array(&self) -> bool {
        matches!(self, Key::Array(_))
    }

    /// Try to get as number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Key::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get as date (milliseconds since epoch).
    pub fn as_date(&self) -> Option<i64> {
        match self {
            Key::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as bytes reference.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Key::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as array of keys.
    pub fn as_array(&self) -> Option<&[Key]> {
        match self {
            Key::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Number(a), Key::Number(b)) => a.total_cmp(b),
            (Key::Date(a), Key::Date(b)) => a.cmp(b),
            (Key::String(a), Key::String(b)) => a.cmp(b),
            (Key::Binary(a), Key::Binary(b)) => a.cmp(b),
            (Key::Array(a), Key::Array(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl From<f64> for Key {
    fn from(v: f64) -> Self {
        Key::Number(v)
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Key::Number(f64::from(v))
    }
}

impl From<u32> for Key {
    fn from(v: u32) -> Self {
        Key::Number(f64::from(v))
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::String(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::String(v.to_string())
    }
}

impl From<Vec<u8>> for Key {
    fn from(v: Vec<u8>) -> Self {
        Key::Binary(v)
    }
}

impl From<Vec<Key>> for Key {
    fn from(v: Vec<Key>) -> Self {
        Key::Array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_accessors() {
        assert_eq!(Key::Number(4.0).as_number(), Some(4.0));
        assert_eq!(Key::Date(1_700_000_000_000).as_date(), Some(1_700_000_000_000));
        assert_eq!(Key::from("abc").as_str(), Some("abc"));
        assert_eq!(Key::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert!(Key::array([Key::from(1), Key::from("a")]).is_array());
        assert!(Key::from("a").as_number().is_none());
    }

    #[test]
    fn test_cross_type_ordering() {
        let mut keys = vec![
            Key::array([Key::from(1)]),
            Key::from(vec![0u8]),
            Key::from("a"),
            Key::Date(0),
            Key::from(100),
        ];
        keys.sort();

        assert_eq!(
            keys,
            vec![
                Key::from(100),
                Key::Date(0),
                Key::from("a"),
                Key::from(vec![0u8]),
                Key::array([Key::from(1)]),
            ]
        );
    }

    #[test]
    fn test_array_ordering() {
        let short = Key::array([Key::from(1), Key::from("a")]);
        let long = Key::array([Key::from(1), Key::from("a"), Key::from(0)]);
        let bigger = Key::array([Key::from(2)]);

        assert!(short < long);
        assert!(long < bigger);
    }

    #[test]
    fn test_number_and_date_never_equal() {
        assert_ne!(Key::Number(5.0), Key::Date(5));
        assert!(Key::Number(f64::MAX) < Key::Date(i64::MIN));
    }

    #[test]
    fn test_nan_is_invalid() {
        assert!(Key::from(1).is_valid());
        assert!(!Key::Number(f64::NAN).is_valid());
        assert!(matches!(
            Key::array([Key::from("x"), Key::Number(f64::NAN)]).validate(),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_key_json_shape() {
        let json = serde_json::to_value(Key::from("abc")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "string", "value": "abc"}));

        let key: Key = serde_json::from_value(serde_json::json!({"type": "date", "value": 10})).unwrap();
        assert_eq!(key, Key::Date(10));
    }
}
