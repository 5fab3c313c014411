//! Per-command row aggregation across devices.

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;

use crate::rows::Row;

/// Provenance timestamp for one execution of the pipeline.
///
/// Captured once, before any device work starts, and stamped identically on
/// every row of the run. It marks the export as a whole, not per-command
/// freshness. Workers share it read-only.
#[derive(Debug, Clone)]
pub struct RunBatch {
    timestamp: String,
}

impl RunBatch {
    /// Capture the batch timestamp (UTC, RFC 3339).
    pub fn start() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// The batch timestamp string.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// In-memory tables of normalized rows, grouped by command identifier.
///
/// Tables are created lazily on first append. Rows arrive in per-device
/// processing order; the exporter imposes the final ordering, so insertion
/// interleaving does not affect table contents. With devices processed
/// concurrently, appends only need a lock around this structure (or a merge
/// of per-worker aggregators).
#[derive(Debug, Default)]
pub struct CommandAggregator {
    tables: IndexMap<String, Vec<Row>>,
}

impl CommandAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rows to the table for a normalized command identifier.
    pub fn append(&mut self, command_id: impl Into<String>, rows: Vec<Row>) {
        self.tables.entry(command_id.into()).or_default().extend(rows);
    }

    /// Merge another aggregator's tables into this one.
    pub fn merge(&mut self, other: CommandAggregator) {
        for (command_id, rows) in other.tables {
            self.append(command_id, rows);
        }
    }

    /// Iterate tables in creation order.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &[Row])> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of tables (including zero-row ones).
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table has been created yet.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn test_tables_created_lazily() {
        let mut agg = CommandAggregator::new();
        assert!(agg.is_empty());

        agg.append("show_version", vec![row(&[("hostname", "R1")])]);
        agg.append("show_version", vec![row(&[("hostname", "R2")])]);
        agg.append("show_ip_int_brief", vec![]);

        assert_eq!(agg.len(), 2);
        let table: Vec<_> = agg.tables().collect();
        assert_eq!(table[0].0, "show_version");
        assert_eq!(table[0].1.len(), 2);
        assert_eq!(table[1].1.len(), 0);
    }

    #[test]
    fn test_merge() {
        let mut a = CommandAggregator::new();
        a.append("show_version", vec![row(&[("hostname", "R1")])]);

        let mut b = CommandAggregator::new();
        b.append("show_version", vec![row(&[("hostname", "R2")])]);
        b.append("show_clock", vec![row(&[("hostname", "R2")])]);

        a.merge(b);
        assert_eq!(a.len(), 2);
        let tables: Vec<_> = a.tables().collect();
        assert_eq!(tables[0].1.len(), 2);
    }

    #[test]
    fn test_run_batch_timestamp_is_fixed() {
        let batch = RunBatch::start();
        let first = batch.timestamp().to_string();
        assert_eq!(batch.timestamp(), first);
        assert!(first.ends_with('Z'));
    }
}
