//! Schema inference from sample values.
//!
//! [`infer`] converts one JSON value into a JSON-Schema-shaped fragment. The shape is
//! decided by [`classify`], not by any declared type:
//!
//! - a container is an **object** when it is associative, i.e. it has at least one
//!   key that is not its zero-based position; otherwise it is an **array**, so `{}`
//!   and `{"0": .., "1": ..}` are arrays;
//! - numbers and numeric strings (`"42"`, `" 1.5e3"`) are **integer**;
//! - booleans, other strings and `null` map to their own leaf.
//!
//! Arrays take their item schema from the first element only; an empty array has
//! `null` items.

use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Shape assigned to a sample value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Object,
    Integer,
    Boolean,
    String,
    Array,
    Null,
}

impl Classification {
    /// Schema `type` name; `None` for null.
    pub fn type_name(self) -> Option<&'static str> {
        match self {
            Classification::Object => Some("object"),
            Classification::Integer => Some("integer"),
            Classification::Boolean => Some("boolean"),
            Classification::String => Some("string"),
            Classification::Array => Some("array"),
            Classification::Null => None,
        }
    }
}

/// Inferred schema fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// `{type: object, properties}` in source key order
    Object(Vec<(String, Schema)>),
    /// `{type: array, items}`
    Array(Box<Schema>),
    /// `{type: integer|string|boolean, example}`
    Leaf { kind: Classification, example: Value },
    /// `{type: null, example: null}`
    Null,
}

impl Schema {
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Schema::Object(_) => Some("object"),
            Schema::Array(_) => Some("array"),
            Schema::Leaf { kind, .. } => kind.type_name(),
            Schema::Null => None,
        }
    }

    pub fn to_value(&self) -> Value {
        // Serializing into a `Value` cannot fail: every key is a string.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", &self.type_name())?;
        match self {
            Schema::Object(properties) => {
                map.serialize_entry("properties", &Properties(properties))?;
            }
            Schema::Array(items) => map.serialize_entry("items", items)?,
            Schema::Leaf { example, .. } => map.serialize_entry("example", example)?,
            Schema::Null => map.serialize_entry("example", &Value::Null)?,
        }
        map.end()
    }
}

struct Properties<'a>(&'a [(String, Schema)]);

impl Serialize for Properties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, schema) in self.0 {
            map.serialize_entry(key, schema)?;
        }
        map.end()
    }
}

/// Infers the schema fragment for `value`.
pub fn infer(value: &Value) -> Schema {
    match classify(value) {
        Classification::Object => {
            let properties = match value {
                Value::Object(map) => map
                    .iter()
                    .map(|(key, child)| (key.clone(), infer(child)))
                    .collect(),
                _ => Vec::new(),
            };
            Schema::Object(properties)
        }
        Classification::Array => {
            let first = match value {
                Value::Array(items) => items.first(),
                Value::Object(map) => map.get("0"),
                _ => None,
            };
            Schema::Array(Box::new(infer(first.unwrap_or(&Value::Null))))
        }
        Classification::Null => Schema::Null,
        kind => Schema::Leaf {
            kind,
            example: value.clone(),
        },
    }
}

/// Classifies a sample value; checks run in the order object, numeric, boolean,
/// string, array, null.
pub fn classify(value: &Value) -> Classification {
    if is_associative(value) {
        return Classification::Object;
    }
    if is_numeric(value) {
        return Classification::Integer;
    }
    match value {
        Value::Bool(_) => Classification::Boolean,
        Value::String(_) => Classification::String,
        Value::Array(_) | Value::Object(_) => Classification::Array,
        Value::Null | Value::Number(_) => Classification::Null,
    }
}

/// Whether a container has at least one key that is not its zero-based position.
pub fn is_associative(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            let associative = map
                .keys()
                .enumerate()
                .any(|(position, key)| key.parse::<usize>().ok() != Some(position) || has_leading_zero(key));
            if !associative && !map.is_empty() {
                debug!("Treating sequentially keyed object with {} entries as an array", map.len());
            }
            associative
        }
        _ => false,
    }
}

fn has_leading_zero(key: &str) -> bool {
    key.len() > 1 && key.starts_with('0')
}

/// Numbers and numeric strings.
pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => is_numeric_str(s),
        _ => false,
    }
}

/// Decimal number with optional sign, fraction and exponent; surrounding whitespace
/// is allowed. Hex, `inf` and `nan` are not numeric.
pub fn is_numeric_str(s: &str) -> bool {
    let s = s.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'));
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits + frac_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}
