// 📂 Record Loader - CSV datasets → canonical flat records
// Trims column headers, treats blank cells as absent, and tags every
// record with its dataset kind and originating file name.

use crate::record::{Record, RecordKind};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Read a CSV file into generic rows: trimmed column name → string value.
/// Blank cells are skipped entirely so field accessors see them as absent.
pub fn load_table(path: &Path) -> Result<Vec<HashMap<String, Value>>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read headers: {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let row = result
            .with_context(|| format!("Failed to parse {} line {}", path.display(), line + 2))?;

        let mut fields = HashMap::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if !cell.trim().is_empty() {
                fields.insert(header.clone(), Value::String(cell.to_string()));
            }
        }
        rows.push(fields);
    }

    Ok(rows)
}

/// Load one pipeline dataset (intake or sales) as tagged records.
/// Row order is preserved: positional edge ids depend on it.
pub fn load_records(path: &Path, kind: RecordKind) -> Result<Vec<Record>> {
    let provenance = file_name(path);
    let rows = load_table(path)?;

    let records = rows
        .into_iter()
        .map(|fields| Record {
            kind,
            fields,
            provenance: provenance.clone(),
        })
        .collect();

    Ok(records)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(content: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "water_network_loader_test_{}_{}.csv",
            std::process::id(),
            content.len()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_table_trims_headers_and_skips_blanks() {
        let path = write_temp_csv(
            " Survey Number , Water Type \n10450,Ground Water\n10451,\n",
        );

        let rows = load_table(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get("Survey Number"),
            Some(&Value::String("10450".to_string()))
        );
        // blank cell never stored
        assert!(!rows[1].contains_key("Water Type"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_records_tags_kind_and_provenance() {
        let path = write_temp_csv("Survey Number\n10450\n10451\n");

        let records = load_records(&path, RecordKind::Intake).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, RecordKind::Intake);
        assert!(records[0].provenance.ends_with(".csv"));
        assert_eq!(records[0].str_field("Survey Number"), Some("10450"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = load_table(Path::new("/nonexistent/intake.csv"));
        assert!(result.is_err());
    }
}
