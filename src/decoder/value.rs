use std::fmt;

use itertools::Itertools;

/// A decoded, schema-less value.
///
/// Maps keep their wire order and allow any value as a key, since some frames
/// mix integer and string keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    /// Only used for unsigned values above `i64::MAX`.
    UInt(u64),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    /// Extension payloads are skipped; only their declared shape is kept.
    Ext { type_id: i8, len: u32 },
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::UInt(_) | Value::Float(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            Value::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Integer identity of a value used as a record key. Accepts integers and
    /// numeric strings, which is how ids arrive once a frame went through JSON.
    pub fn as_id(&self) -> Option<i64> {
        match self {
            Value::String(s) => s.trim().parse().ok(),
            other => other.as_i64(),
        }
    }

    /// Looks up a string key in a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Like [`Value::get`] but treats an explicit nil as absent.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_nil())
    }

    /// Follows a chain of string keys.
    pub fn path(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().try_fold(self, |value, key| value.field(key))
    }

    pub fn i64_field(&self, key: &str) -> Option<i64> {
        self.field(key).and_then(Value::as_i64)
    }

    /// Keyed records: `(id, record)` pairs out of either a map keyed by id or
    /// an array indexed by id.
    pub fn records(&self) -> Vec<(i64, &Value)> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .filter_map(|(k, v)| k.as_id().map(|id| (id, v)))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_nil())
                .map(|(idx, v)| (idx as i64, v))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Integer items of an array, skipping anything else.
    pub fn int_items(&self) -> Vec<i64> {
        self.as_array()
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default()
    }

    /// String form of a value used as a map key in fingerprints and reports.
    pub fn key_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Map keys rendered as strings, sorted.
    pub fn sorted_keys(&self) -> Vec<String> {
        self.as_map()
            .map(|entries| entries.iter().map(|(k, _)| k.key_string()).sorted().collect())
            .unwrap_or_default()
    }

    /// Coarse type label in the vocabulary of the JSON world the frames come from.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::UInt(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Array(_) => "array",
            Value::Map(_) => "object",
            Value::Ext { .. } => "ext",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Nil => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(v) => Json::from(*v),
            Value::UInt(v) => Json::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Binary(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.key_string(), v.to_json()))
                    .collect(),
            ),
            Value::Ext { type_id, len } => serde_json::json!({ "type": "ext", "extType": type_id, "length": len }),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Value::Int(v)
                } else if let Some(v) = n.as_u64() {
                    Value::UInt(v)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (Value::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Value::Array(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Map(entries) => write!(
                f,
                "{{{}}}",
                entries.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")
            ),
            Value::Ext { type_id, len } => write!(f, "<ext {type_id} len {len}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_become_string_keyed_maps() {
        let value = Value::from(json!({ "id": 130, "data": { "type": 91 } }));
        assert_eq!(value.i64_field("id"), Some(130));
        assert_eq!(value.path(&["data", "type"]).and_then(Value::as_i64), Some(91));
        assert_eq!(value.sorted_keys(), vec!["data", "id"]);
    }

    #[test]
    fn records_accept_maps_and_arrays() {
        let keyed = Value::from(json!({ "3": { "x": 1 }, "7": { "x": 2 } }));
        let ids: Vec<i64> = keyed.records().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![3, 7]);

        let indexed = Value::from(json!([{ "x": 1 }, null, { "x": 3 }]));
        let ids: Vec<i64> = indexed.records().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn integer_keys_resolve_as_ids() {
        let value = Value::Map(vec![(Value::Int(4), Value::Bool(true))]);
        assert_eq!(value.records()[0].0, 4);
        assert_eq!(value.get("4"), None);
    }

    #[test]
    fn nil_fields_are_absent() {
        let value = Value::from(json!({ "owner": null }));
        assert!(value.get("owner").is_some());
        assert!(value.field("owner").is_none());
    }
}
