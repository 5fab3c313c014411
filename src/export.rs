//! CSV table export.
//!
//! One file per non-empty command table. Column order and row order are
//! fully deterministic, so re-exporting the same aggregator produces
//! byte-identical files.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::Value;

use crate::aggregate::CommandAggregator;
use crate::error::ExportError;
use crate::rows::Row;

/// Metadata columns, in their fixed leading priority order.
pub const META_COLUMNS: [&str; 7] = [
    "hostname",
    "site",
    "role",
    "os",
    "timestamp",
    "command",
    "parse_engine",
];

/// Export every non-empty table as `{output_dir}/{command_id}.csv`.
///
/// The output directory is created if absent. Returns the written paths.
/// Failures are fatal for the run; files already written stay in place.
pub fn export_tables(
    aggregator: &CommandAggregator,
    output_dir: &Path,
) -> std::result::Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for (command_id, rows) in aggregator.tables() {
        if rows.is_empty() {
            debug!("skipping '{}': no rows", command_id);
            continue;
        }

        let path = output_dir.join(format!("{}.csv", command_id));
        write_table(&path, rows)?;
        info!("wrote {} ({} rows)", path.display(), rows.len());
        written.push(path);
    }

    Ok(written)
}

fn write_table(path: &Path, rows: &[Row]) -> std::result::Result<(), ExportError> {
    let columns = column_order(rows);

    let mut sorted: Vec<&Row> = rows.iter().collect();
    // Stable sort: rows with equal hostnames keep insertion order.
    sorted.sort_by(|a, b| hostname_of(a).cmp(hostname_of(b)));

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for row in sorted {
        let record = columns
            .iter()
            .map(|column| cell_text(row.get(column.as_str())));
        writer.write_record(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Column order for a table: metadata columns first (fixed priority,
/// filtered to those present in the union), then the remaining field names
/// sorted lexicographically.
fn column_order(rows: &[Row]) -> Vec<String> {
    let mut union = BTreeSet::new();
    for row in rows {
        for key in row.keys() {
            union.insert(key.as_str());
        }
    }

    let mut columns: Vec<String> = META_COLUMNS
        .iter()
        .filter(|meta| union.contains(**meta))
        .map(|meta| meta.to_string())
        .collect();

    columns.extend(
        union
            .into_iter()
            .filter(|key| !META_COLUMNS.contains(key))
            .map(|key| key.to_string()),
    );

    columns
}

fn hostname_of(row: &Row) -> &str {
    row.get("hostname").and_then(Value::as_str).unwrap_or("")
}

/// Stringify one cell: scalars as-is, absent fields as the empty string,
/// compound leftovers as compact JSON.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_column_union_and_fill() {
        let mut agg = CommandAggregator::new();
        agg.append(
            "t",
            vec![
                row(&[("hostname", json!("R1")), ("x", json!(1))]),
                row(&[("hostname", json!("R2")), ("y", json!(2))]),
            ],
        );

        let dir = tempfile::tempdir().unwrap();
        let written = export_tables(&agg, dir.path()).unwrap();
        assert_eq!(written.len(), 1);

        let text = std::fs::read_to_string(&written[0]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "hostname,x,y");
        assert_eq!(lines[1], "R1,1,");
        assert_eq!(lines[2], "R2,,2");
    }

    #[test]
    fn test_rows_sorted_by_hostname_stable() {
        let mut agg = CommandAggregator::new();
        agg.append(
            "t",
            vec![
                row(&[("hostname", json!("R2")), ("seq", json!("first"))]),
                row(&[("hostname", json!("R1")), ("seq", json!("a"))]),
                row(&[("hostname", json!("R2")), ("seq", json!("second"))]),
            ],
        );

        let dir = tempfile::tempdir().unwrap();
        let written = export_tables(&agg, dir.path()).unwrap();
        let text = std::fs::read_to_string(&written[0]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "R1,a");
        assert_eq!(lines[2], "R2,first");
        assert_eq!(lines[3], "R2,second");
    }

    #[test]
    fn test_export_is_idempotent() {
        let mut agg = CommandAggregator::new();
        agg.append(
            "t",
            vec![
                row(&[("hostname", json!("R1")), ("b", json!("2")), ("a", json!("1"))]),
                row(&[("hostname", json!("R2")), ("c", json!("3"))]),
            ],
        );

        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let first = export_tables(&agg, dir_a.path()).unwrap();
        let second = export_tables(&agg, dir_b.path()).unwrap();

        let bytes_a = std::fs::read(&first[0]).unwrap();
        let bytes_b = std::fs::read(&second[0]).unwrap();
        assert_eq!(bytes_a, bytes_b);
    }

    #[test]
    fn test_zero_row_tables_emit_no_file() {
        let mut agg = CommandAggregator::new();
        agg.append("empty_table", vec![]);

        let dir = tempfile::tempdir().unwrap();
        let written = export_tables(&agg, dir.path()).unwrap();
        assert!(written.is_empty());
        assert!(!dir.path().join("empty_table.csv").exists());
    }

    #[test]
    fn test_metadata_columns_lead_in_priority_order() {
        let mut agg = CommandAggregator::new();
        agg.append(
            "t",
            vec![row(&[
                ("interface", json!("Gi0/0")),
                ("parse_engine", json!("structured")),
                ("hostname", json!("R1")),
                ("os", json!("iosxe")),
                ("aaa", json!("1")),
            ])],
        );

        let dir = tempfile::tempdir().unwrap();
        let written = export_tables(&agg, dir.path()).unwrap();
        let text = std::fs::read_to_string(&written[0]).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "hostname,os,parse_engine,aaa,interface");
    }

    #[test]
    fn test_output_directory_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("csv");

        let mut agg = CommandAggregator::new();
        agg.append("t", vec![row(&[("hostname", json!("R1"))])]);

        export_tables(&agg, &nested).unwrap();
        assert!(nested.join("t.csv").exists());
    }
}
