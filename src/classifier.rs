//! Structural filtering and deduplication of decoded frames.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::decoder::Value;
use crate::protocol::{Direction, Envelope};

/// Frames with no actionable content: nil or non-map values, empty maps, and
/// maps whose single field is a number.
pub fn is_negligible(frame: Option<&Value>) -> bool {
    let Some(entries) = frame.and_then(Value::as_map) else {
        return true;
    };
    match entries {
        [] => true,
        [(_, value)] => value.is_number(),
        _ => false,
    }
}

/// Structural key naming the message type of a frame, not its content.
pub fn fingerprint(frame: &Value) -> String {
    if !frame.is_map() {
        return format!("primitive_{}_{frame}", frame.kind_name());
    }
    if let Some(name) = frame.field("type").and_then(Value::as_str) {
        return format!("type_string_{name}");
    }
    let nested_type = frame.path(&["data", "type"]);
    if let Some(id) = frame.field("id") {
        return match nested_type {
            Some(kind) => {
                let shape = match frame.path(&["data", "payload"]) {
                    Some(payload @ Value::Map(_)) => payload.sorted_keys().join(","),
                    Some(Value::Array(_)) => "array".to_string(),
                    _ => "no_payload".to_string(),
                };
                format!(
                    "id_{}_type_{}_payload_{shape}",
                    id.key_string(),
                    kind.key_string()
                )
            }
            None => format!("id_only_{}", id.key_string()),
        };
    }
    if let Some(kind) = nested_type {
        return format!("nested_type_{}", kind.key_string());
    }
    structure_signature(frame)
}

fn structure_signature(frame: &Value) -> String {
    let parts = frame
        .as_map()
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| {
            let shape = match value {
                Value::Map(_) => value.sorted_keys().join(","),
                other => other.kind_name().to_string(),
            };
            (key.key_string(), shape)
        })
        .sorted()
        .map(|(key, shape)| format!("{key}:{shape}"))
        .join("|");
    format!("structure_{parts}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Catalog of distinct shapes: the first frame of each fingerprint wins.
    #[default]
    KeepFirst,
    /// Most recent content per fingerprint.
    KeepLatest,
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub fingerprint: String,
    pub direction: Direction,
    pub frame: Value,
    pub count: usize,
}

/// Deduplicated record of the frames seen in a session.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    pub policy: DedupPolicy,
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    skipped: usize,
}

impl MessageCatalog {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Records a frame; returns false when it was filtered out or merged into
    /// an existing entry.
    pub fn record(&mut self, direction: Direction, frame: &Value) -> bool {
        if is_negligible(Some(frame)) || Envelope::classify(frame).is_heartbeat() {
            self.skipped += 1;
            return false;
        }
        let key = fingerprint(frame);
        if let Some(&idx) = self.index.get(&key) {
            let entry = &mut self.entries[idx];
            entry.count += 1;
            if self.policy == DedupPolicy::KeepLatest {
                entry.direction = direction;
                entry.frame = frame.clone();
            }
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(CatalogEntry {
            fingerprint: key,
            direction,
            frame: frame.clone(),
            count: 1,
        });
        true
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, fingerprint: &str) -> Option<&CatalogEntry> {
        self.index.get(fingerprint).map(|&idx| &self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frames dropped as negligible or heartbeat.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn negligible_frames() {
        assert!(is_negligible(None));
        assert!(is_negligible(Some(&Value::Nil)));
        assert!(is_negligible(Some(&Value::Int(4))));
        assert!(is_negligible(Some(&v(json!({})))));
        assert!(is_negligible(Some(&v(json!({ "data": 2 })))));
        assert!(!is_negligible(Some(&v(json!({ "data": "x" })))));
        assert!(!is_negligible(Some(&v(json!({ "id": 1, "data": 2 })))));
    }

    #[test]
    fn fingerprint_formats() {
        assert_eq!(
            fingerprint(&v(json!({ "type": "Connected", "x": 1 }))),
            "type_string_Connected"
        );
        assert_eq!(
            fingerprint(&v(json!({ "id": 130, "data": { "type": 91, "payload": { "diff": {}, "a": 1 } } }))),
            "id_130_type_91_payload_a,diff"
        );
        assert_eq!(
            fingerprint(&v(json!({ "id": "130", "data": { "type": 30, "payload": [1, 2] } }))),
            "id_130_type_30_payload_array"
        );
        assert_eq!(
            fingerprint(&v(json!({ "id": 7, "data": { "type": 5 } }))),
            "id_7_type_5_payload_no_payload"
        );
        assert_eq!(fingerprint(&v(json!({ "id": 7, "data": 1 }))), "id_only_7");
        assert_eq!(
            fingerprint(&v(json!({ "data": { "type": 3 } }))),
            "nested_type_3"
        );
        assert_eq!(
            fingerprint(&v(json!({ "type": 4, "payload": { "b": 1, "a": 2 } }))),
            "structure_payload:a,b|type:number"
        );
    }

    #[test]
    fn distinct_shapes_get_distinct_fingerprints() {
        let a = v(json!({ "type": 4, "payload": {} }));
        let b = v(json!({ "kind": 4, "body": {} }));
        assert_eq!(fingerprint(&a), fingerprint(&a));
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn keep_first_counts_duplicates() {
        let mut catalog = MessageCatalog::new(DedupPolicy::KeepFirst);
        let first = v(json!({ "id": 130, "data": { "type": 91, "payload": { "diff": { "n": 1 } } } }));
        let second = v(json!({ "id": 130, "data": { "type": 91, "payload": { "diff": { "n": 2 } } } }));
        assert!(catalog.record(Direction::Incoming, &first));
        assert!(!catalog.record(Direction::Incoming, &second));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].count, 2);
        assert_eq!(catalog.entries()[0].frame, first);
    }

    #[test]
    fn keep_latest_overwrites() {
        let mut catalog = MessageCatalog::new(DedupPolicy::KeepLatest);
        let first = v(json!({ "type": "Ping", "n": 1 }));
        let second = v(json!({ "type": "Ping", "n": 2 }));
        catalog.record(Direction::Incoming, &first);
        catalog.record(Direction::Outgoing, &second);
        let entry = catalog.get("type_string_Ping").unwrap();
        assert_eq!(entry.frame, second);
        assert_eq!(entry.direction, Direction::Outgoing);
    }

    #[test]
    fn heartbeats_and_negligible_frames_are_skipped() {
        let mut catalog = MessageCatalog::default();
        assert!(!catalog.record(Direction::Incoming, &v(json!({ "id": 136, "data": { "timestamp": 123 } }))));
        assert!(!catalog.record(Direction::Incoming, &v(json!({ "data": 2 }))));
        assert!(catalog.is_empty());
        assert_eq!(catalog.skipped(), 2);
    }
}
