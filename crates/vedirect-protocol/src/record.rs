//! Raw and typed telemetry records

use crate::catalog::Unit;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Key/value strings of one checksum-valid frame, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing the value of an existing key in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// A decoded field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// One decoded field of a typed record
#[derive(Debug, Clone, PartialEq)]
pub struct TypedField {
    /// Wire key
    pub key: String,
    /// Canonical name from the catalog
    pub name: &'static str,
    pub unit: Unit,
    pub value: Value,
}

impl TypedField {
    /// Value rendered with its unit for display
    pub fn display(&self) -> String {
        match self.value.as_f64() {
            Some(v) => self.unit.display(v),
            None => self.value.to_string(),
        }
    }
}

/// Decoded, unit-tagged fields of one frame
///
/// Serializes as a map from canonical name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedRecord {
    fields: Vec<TypedField>,
}

impl TypedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: TypedField) {
        self.fields.push(field);
    }

    /// Value for a wire key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Value for a canonical name
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn fields(&self) -> &[TypedField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for TypedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(field.name, &field.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order_and_replaces() {
        let mut record = RawRecord::new();
        record.insert("V", "12800");
        record.insert("I", "150");
        record.insert("V", "12700");

        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec!["V", "I"]);
        assert_eq!(record.get("V"), Some("12700"));
    }

    #[test]
    fn test_typed_record_serializes_by_name() {
        let mut record = TypedRecord::new();
        record.push(TypedField {
            key: "V".into(),
            name: "batteryVoltage",
            unit: Unit::MilliVolt,
            value: Value::Int(12800),
        });
        record.push(TypedField {
            key: "CS".into(),
            name: "mode",
            unit: Unit::None,
            value: Value::Text("Bulk".into()),
        });

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"batteryVoltage":12800,"mode":"Bulk"}"#);
    }

    #[test]
    fn test_field_display() {
        let field = TypedField {
            key: "V".into(),
            name: "batteryVoltage",
            unit: Unit::MilliVolt,
            value: Value::Int(12800),
        };
        assert_eq!(field.display(), "12.80 V");
    }
}
