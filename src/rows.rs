//! Row normalization.
//!
//! Parse engines produce loosely structured rows; this module reshapes
//! mapping-of-mappings output into row sequences, flattens nested values by
//! exactly one level, and merges the per-device metadata block into every
//! row.

use indexmap::IndexMap;
use serde_json::Value;

use crate::device::ClassifiedDevice;
use crate::engine::EngineTag;

/// One normalized row: field name to scalar-ish value.
pub type Row = IndexMap<String, Value>;

/// Metadata block merged into every row of a parse result.
#[derive(Debug, Clone)]
pub struct RowMetadata<'a> {
    pub hostname: &'a str,
    pub site: &'a str,
    pub role: &'a str,
    pub os: &'a str,
    pub timestamp: &'a str,
    pub command: &'a str,
    pub parse_engine: EngineTag,
}

impl<'a> RowMetadata<'a> {
    /// Build the metadata block for one (device, command) parse result.
    pub fn new(
        device: &'a ClassifiedDevice,
        timestamp: &'a str,
        command: &'a str,
        parse_engine: EngineTag,
    ) -> Self {
        Self {
            hostname: &device.hostname,
            site: device.site.as_deref().unwrap_or(""),
            role: device.role.as_deref().unwrap_or(""),
            os: &device.os,
            timestamp,
            command,
            parse_engine,
        }
    }
}

/// Reshape an engine's raw parsed structure into a row sequence.
///
/// A sequence of mappings is already row-shaped. A mapping-of-mappings is
/// converted key-by-key: the outer key becomes a `_key` field and the inner
/// mapping's entries become the row's fields. Anything else has no tabular
/// interpretation and yields `None`.
pub fn reshape_parsed(parsed: &Value) -> Option<Vec<Row>> {
    match parsed {
        Value::Array(items) => {
            if items.is_empty() || !items.iter().all(Value::is_object) {
                return None;
            }
            let rows = items
                .iter()
                .filter_map(Value::as_object)
                .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .collect();
            Some(rows)
        }
        Value::Object(map) => {
            if map.is_empty() || !map.values().all(Value::is_object) {
                return None;
            }
            let rows = map
                .iter()
                .map(|(key, value)| {
                    let mut row = Row::new();
                    row.insert("_key".to_string(), Value::String(key.clone()));
                    if let Some(inner) = value.as_object() {
                        for (k, v) in inner {
                            row.insert(k.clone(), v.clone());
                        }
                    }
                    row
                })
                .collect();
            Some(rows)
        }
        _ => None,
    }
}

/// Flatten one level of nested mappings inside a row.
///
/// A field whose value is a mapping is replaced by `{parent}_{child}`
/// entries, one per child. The expansion is deliberately non-recursive:
/// grandchildren survive as values so downstream consumers see a stable
/// schema. Field names are lower-cased.
pub fn flatten_row(row: Row) -> Row {
    let mut out = Row::with_capacity(row.len());
    for (key, value) in row {
        match value {
            Value::Object(children) => {
                for (child_key, child_value) in children {
                    out.insert(format!("{}_{}", key, child_key).to_lowercase(), child_value);
                }
            }
            other => {
                out.insert(key.to_lowercase(), other);
            }
        }
    }
    out
}

/// Flatten every row and merge the metadata block into it.
///
/// Metadata fields are inserted first so they lead the row's display order;
/// engine-produced fields take logical precedence when a name collides.
pub fn normalize_rows(rows: Vec<Row>, meta: &RowMetadata<'_>) -> Vec<Row> {
    rows.into_iter()
        .map(|row| {
            let flat = flatten_row(row);

            let mut out = Row::with_capacity(flat.len() + 7);
            out.insert("hostname".to_string(), Value::String(meta.hostname.to_string()));
            out.insert("site".to_string(), Value::String(meta.site.to_string()));
            out.insert("role".to_string(), Value::String(meta.role.to_string()));
            out.insert("os".to_string(), Value::String(meta.os.to_string()));
            out.insert(
                "timestamp".to_string(),
                Value::String(meta.timestamp.to_string()),
            );
            out.insert("command".to_string(), Value::String(meta.command.to_string()));
            out.insert(
                "parse_engine".to_string(),
                Value::String(meta.parse_engine.to_string()),
            );

            for (key, value) in flat {
                out.insert(key, value);
            }

            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::platform::PlatformEntry;

    fn device() -> ClassifiedDevice {
        ClassifiedDevice {
            hostname: "R1".to_string(),
            mgmt_ip: "10.0.0.1".to_string(),
            vendor: "cisco".to_string(),
            os: "iosxe".to_string(),
            model: None,
            site: Some("dc1".to_string()),
            role: Some("core".to_string()),
            platform: PlatformEntry {
                session_platform: "cisco_iosxe",
                template_platform: "cisco_ios",
            },
        }
    }

    fn row_of(value: Value) -> Row {
        value
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    #[test]
    fn test_reshape_sequence_of_mappings() {
        let parsed = json!([{"a": 1}, {"b": 2}]);
        let rows = reshape_parsed(&parsed).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_reshape_mapping_of_mappings() {
        let parsed = json!({
            "Gi0/0": {"status": "up", "proto": "up"},
            "Gi0/1": {"status": "down", "proto": "down"},
        });
        let rows = reshape_parsed(&parsed).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("_key"), Some(&json!("Gi0/0")));
        assert_eq!(rows[0].get("status"), Some(&json!("up")));
    }

    #[test]
    fn test_reshape_rejects_scalars_and_mixed_shapes() {
        assert!(reshape_parsed(&json!("text")).is_none());
        assert!(reshape_parsed(&json!([1, 2, 3])).is_none());
        assert!(reshape_parsed(&json!({"a": 1, "b": {"c": 2}})).is_none());
        assert!(reshape_parsed(&json!([])).is_none());
    }

    #[test]
    fn test_flatten_is_one_level_only() {
        let row = row_of(json!({
            "iface": "Gi0/0",
            "counters": {"in": 10, "out": {"unicast": 5}},
        }));
        let flat = flatten_row(row);

        assert_eq!(flat.get("iface"), Some(&json!("Gi0/0")));
        assert_eq!(flat.get("counters_in"), Some(&json!(10)));
        // Grandchild stays nested: truncation at one level is the contract.
        assert_eq!(flat.get("counters_out"), Some(&json!({"unicast": 5})));
    }

    #[test]
    fn test_flatten_lowercases_field_names() {
        let row = row_of(json!({"Interface": "Gi0/0", "Stats": {"RX": 1}}));
        let flat = flatten_row(row);
        assert!(flat.contains_key("interface"));
        assert!(flat.contains_key("stats_rx"));
    }

    #[test]
    fn test_metadata_merge() {
        let dev = device();
        let meta = RowMetadata::new(&dev, "2026-01-01T00:00:00Z", "show ip int brief", EngineTag::Structured);
        let rows = normalize_rows(vec![row_of(json!({"interface": "Gi0/0"}))], &meta);

        let row = &rows[0];
        assert_eq!(row.get("hostname"), Some(&json!("R1")));
        assert_eq!(row.get("site"), Some(&json!("dc1")));
        assert_eq!(row.get("role"), Some(&json!("core")));
        assert_eq!(row.get("os"), Some(&json!("iosxe")));
        assert_eq!(row.get("timestamp"), Some(&json!("2026-01-01T00:00:00Z")));
        assert_eq!(row.get("command"), Some(&json!("show ip int brief")));
        assert_eq!(row.get("parse_engine"), Some(&json!("structured")));
        assert_eq!(row.get("interface"), Some(&json!("Gi0/0")));
    }

    #[test]
    fn test_engine_fields_take_precedence_on_collision() {
        let dev = device();
        let meta = RowMetadata::new(&dev, "t", "show x", EngineTag::GenericTokens);
        let rows = normalize_rows(vec![row_of(json!({"os": "from-engine"}))], &meta);
        assert_eq!(rows[0].get("os"), Some(&json!("from-engine")));
    }

    #[test]
    fn test_missing_site_and_role_become_empty() {
        let mut dev = device();
        dev.site = None;
        dev.role = None;
        let meta = RowMetadata::new(&dev, "t", "show x", EngineTag::GenericTokens);
        let rows = normalize_rows(vec![row_of(json!({"a": 1}))], &meta);
        assert_eq!(rows[0].get("site"), Some(&json!("")));
        assert_eq!(rows[0].get("role"), Some(&json!("")));
    }
}
