//! Parsed JSON values

use ahash::RandomState;
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// A parsed document
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Floating-point number
    Number(f64),
    /// Exact integer (only with exact-integer output)
    Integer(BigInt),
    /// String
    String(String),
    /// Array
    Array(Vec<Value>),
    /// Object with keys in first-seen order
    Object(Map),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create an integer value
    pub fn integer(n: impl Into<BigInt>) -> Self {
        Value::Integer(n.into())
    }

    /// Create an object from pairs; later duplicates replace earlier ones
    pub fn object<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut map = Map::new();
        for (key, value) in pairs {
            map.insert(key.into(), value);
        }
        Value::Object(map)
    }

    /// Check if this is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as float; exact integers are rounded
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Integer(n) => n.to_f64(),
            _ => None,
        }
    }

    /// Get as exact integer
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Get as `i64`, from an exact integer or an integral float in range
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => n.to_i64(),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Some(*n as i64),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get as object
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Member of an object
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Element of an array
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Short type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) | Value::Integer(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}

// ============================================================================
// Map
// ============================================================================

/// Object members in first-seen key order
///
/// Backed by an [`IndexMap`]: lookups hash, iteration follows insertion
/// order, and re-inserting a key replaces its value in place. Equality
/// ignores order, as it does for JSON objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    entries: IndexMap<String, Value, RandomState>,
}

impl Map {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty map with room for `capacity` members
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Insert a member; an existing key keeps its position and gets the
    /// new value, and the old value is returned
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    /// Value for a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no members
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Members in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

// ============================================================================
// Serialization
// ============================================================================

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Integer(n) => {
                if let Some(small) = n.to_i64() {
                    serializer.serialize_i64(small)
                } else if let Some(small) = n.to_u64() {
                    serializer.serialize_u64(small)
                } else {
                    serializer.serialize_str(&n.to_string())
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => map.serialize(serializer),
        }
    }
}

impl Serialize for Map {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            out.serialize_entry(key, value)?;
        }
        out.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keeps_first_position() {
        let mut map = Map::new();
        assert!(map.insert("a".into(), Value::from(1.0)).is_none());
        map.insert("b".into(), Value::from(2.0));
        let old = map.insert("a".into(), Value::from(3.0));
        assert_eq!(old, Some(Value::Number(1.0)));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_wide_map() {
        let mut map = Map::with_capacity(50_000);
        for i in 0..50_000 {
            map.insert(format!("k{}", i), Value::from(i as f64));
        }
        map.insert("k0".into(), Value::Null);
        assert_eq!(map.len(), 50_000);
        assert_eq!(map.keys().next(), Some("k0"));
        assert_eq!(map.keys().last(), Some("k49999"));
        assert_eq!(map.get("k0"), Some(&Value::Null));
        assert_eq!(map.get("k31337"), Some(&Value::Number(31337.0)));
    }

    #[test]
    fn test_object_equality_ignores_order() {
        let ab = Value::object([("a", Value::Null), ("b", Value::Bool(true))]);
        let ba = Value::object([("b", Value::Bool(true)), ("a", Value::Null)]);
        assert_eq!(ab, ba);
        assert_ne!(ab.to_string(), ba.to_string());
    }

    #[test]
    fn test_accessors() {
        let value = Value::object([
            ("name", Value::from("x")),
            ("tags", Value::from(vec![Value::Bool(true), Value::Null])),
        ]);
        assert_eq!(value.get("name").and_then(Value::as_str), Some("x"));
        assert_eq!(value.get("tags").and_then(|t| t.at(0)), Some(&Value::Bool(true)));
        assert!(value.get("tags").and_then(|t| t.at(1)).unwrap().is_null());
        assert_eq!(value.type_name(), "object");
        assert!(value.get("missing").is_none());
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(Value::integer(42).as_i64(), Some(42));
        assert_eq!(Value::Number(7.0).as_i64(), Some(7));
        assert_eq!(Value::Number(7.5).as_i64(), None);
    }

    #[test]
    fn test_serialize_ordered() {
        let value = Value::object([("z", Value::Null), ("a", Value::from(1.5))]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"z":null,"a":1.5}"#);
        assert_eq!(value.to_string(), r#"{"z":null,"a":1.5}"#);
    }

    #[test]
    fn test_serialize_big_integer_as_string() {
        let huge: BigInt = "123456789012345678901234567890".parse().unwrap();
        let value = Value::Array(vec![Value::integer(-5), Value::Integer(huge)]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"[-5,"123456789012345678901234567890"]"#
        );
    }
}
