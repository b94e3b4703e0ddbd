//! # Bulk Label Generation
//!
//! Records are loaded wholesale from CSV (header row maps 1:1 to fields) or
//! JSON (array of flat objects), validated per field, and rendered one by one
//! against a template.
//!
//! ```text
//! import_csv / import_json ─► Validator::validate ─► BulkGenerator::generate ─► export_jobs_csv
//!        (≤ 1000 records)        valid | invalid        progress per record
//! ```

mod generate;
mod validate;

pub use generate::{
    BulkGenerator, GeneratedLabel, GenerationJob, GenerationOutput, JobStatus, Progress,
    RecordFailure, export_jobs_csv, JOB_CSV_COLUMNS,
};
pub use validate::{FieldRule, InvalidRecord, ValidationReport, Validator};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::binding::DataContext;
use crate::error::LabelError;

/// Maximum number of records accepted by one import.
pub const MAX_RECORDS: usize = 1000;

/// One row of bulk input. `index` is the 0-based position in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub index: usize,
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(index: usize, fields: BTreeMap<String, String>) -> Self {
        Self { index, fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn to_context(&self) -> DataContext {
        self.fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Input format for bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// Guess from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Some(ImportFormat::Csv),
            Some("json") => Some(ImportFormat::Json),
            _ => None,
        }
    }
}

fn check_limit(count: usize) -> Result<(), LabelError> {
    if count > MAX_RECORDS {
        return Err(LabelError::Import(format!(
            "{} records exceeds the limit of {}",
            count, MAX_RECORDS
        )));
    }
    Ok(())
}

/// Read CSV with a header row. Short rows are padded with empty values;
/// values are trimmed.
pub fn import_csv<R: Read>(reader: R) -> Result<Vec<Record>, LabelError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(LabelError::Import("CSV has no header row".into()));
    }

    let mut records = Vec::new();
    for (index, row) in csv.records().enumerate() {
        let row = row?;
        check_limit(index + 1)?;
        let fields = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(i, h)| (h.to_string(), row.get(i).unwrap_or("").to_string()))
            .collect();
        records.push(Record::new(index, fields));
    }
    Ok(records)
}

/// Read a JSON array of flat objects. Scalars are stringified, `null`
/// becomes an empty string, nested arrays/objects are rejected.
pub fn import_json(json: &str) -> Result<Vec<Record>, LabelError> {
    use serde_json::Value;

    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(LabelError::Import("expected a JSON array of objects".into()));
    };
    check_limit(items.len())?;

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let map = match item {
                Value::Object(map) => map,
                other => {
                    return Err(LabelError::Import(format!(
                        "record {}: expected object, got {}",
                        index, other
                    )));
                }
            };
            let fields = map
                .into_iter()
                .map(|(key, v)| {
                    let text = match v {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        Value::Bool(b) => b.to_string(),
                        Value::Number(n) => n.to_string(),
                        Value::Array(_) | Value::Object(_) => {
                            return Err(LabelError::Import(format!(
                                "record {}: field '{}' must be a scalar",
                                index, key
                            )));
                        }
                    };
                    Ok((key, text))
                })
                .collect::<Result<_, _>>()?;
            Ok(Record::new(index, fields))
        })
        .collect()
}

/// Load records from a file, using the extension to pick the format.
pub fn import_path(path: &Path) -> Result<Vec<Record>, LabelError> {
    let format = ImportFormat::from_path(path).ok_or_else(|| {
        LabelError::Import(format!(
            "cannot tell the format of {} (expected .csv or .json)",
            path.display()
        ))
    })?;
    match format {
        ImportFormat::Csv => import_csv(std::fs::File::open(path)?),
        ImportFormat::Json => import_json(&std::fs::read_to_string(path)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_headers_map_fields() {
        let csv = "name,address,tracking\n\"A\",\"B\",\"\"\nC, D ,T1\n";
        let records = import_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("name"), Some("A"));
        assert_eq!(records[0].get("tracking"), Some(""));
        assert_eq!(records[1].get("address"), Some("D"));
        assert_eq!(records[1].index, 1);
    }

    #[test]
    fn test_csv_short_rows_padded() {
        let records = import_csv("a,b\n1\n".as_bytes()).unwrap();
        assert_eq!(records[0].get("b"), Some(""));
    }

    #[test]
    fn test_csv_limit() {
        let mut csv = String::from("name\n");
        for i in 0..=MAX_RECORDS {
            csv.push_str(&format!("n{}\n", i));
        }
        assert!(matches!(import_csv(csv.as_bytes()), Err(LabelError::Import(_))));
    }

    #[test]
    fn test_json_scalars() {
        let records =
            import_json(r#"[{"name": "Ada", "weight": 2.5, "fragile": true, "note": null}]"#)
                .unwrap();
        let r = &records[0];
        assert_eq!(r.get("weight"), Some("2.5"));
        assert_eq!(r.get("fragile"), Some("true"));
        assert_eq!(r.get("note"), Some(""));
    }

    #[test]
    fn test_json_rejects_nested_and_non_arrays() {
        assert!(import_json(r#"[{"a": {"b": 1}}]"#).is_err());
        assert!(import_json(r#"{"a": 1}"#).is_err());
        assert!(import_json(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_record_context() {
        let records = import_json(r#"[{"trackingNumber": "CM-1"}]"#).unwrap();
        let ctx = records[0].to_context();
        assert_eq!(ctx.get("trackingNumber"), Some("CM-1"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ImportFormat::from_path(Path::new("x.CSV")), Some(ImportFormat::Csv));
        assert_eq!(ImportFormat::from_path(Path::new("x.json")), Some(ImportFormat::Json));
        assert_eq!(ImportFormat::from_path(Path::new("x.txt")), None);
    }
}
