//! # Input Detection
//!
//! Reads a data object and splits it into records. Strict JSON is tried
//! first; anything that fails to parse as JSON is read as comma-delimited
//! text with a header row.

use std::path::Path;

use serde_json::Value;

use dccv_core::{DataLoadError, DataRecord};

/// How a data object was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// A JSON array of records, or a single JSON record.
    Json,
    /// Delimited text with a header row.
    Tabular,
}

impl DataFormat {
    /// Number used to label the first record in violation messages.
    ///
    /// Tabular records start at 2 because line 1 holds the header.
    pub fn first_record_number(self) -> usize {
        match self {
            Self::Json => 1,
            Self::Tabular => 2,
        }
    }
}

/// All records of one data object, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    pub format: DataFormat,
    pub records: Vec<DataRecord>,
}

impl RecordBatch {
    /// Records paired with their display numbers.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &DataRecord)> {
        let first = self.format.first_record_number();
        self.records
            .iter()
            .enumerate()
            .map(move |(index, record)| (first + index, record))
    }
}

/// Read and split the data object at `path`.
pub fn read_records(path: &Path) -> Result<RecordBatch, DataLoadError> {
    let bytes = std::fs::read(path).map_err(|e| DataLoadError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_records(&path.display().to_string(), &bytes)
}

/// Split an in-memory data object. `label` names it in error messages.
pub fn parse_records(label: &str, bytes: &[u8]) -> Result<RecordBatch, DataLoadError> {
    let failure = |reason: String| DataLoadError::FormatDetection {
        path: label.to_string(),
        reason,
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(failure("input is empty".to_string()));
    }

    let json_error = match serde_json::from_slice::<Value>(bytes) {
        Ok(document) => {
            let records = json_records(document).map_err(failure)?;
            tracing::debug!(input = %label, records = records.len(), "read JSON records");
            return Ok(RecordBatch {
                format: DataFormat::Json,
                records,
            });
        }
        Err(e) => e,
    };

    match tabular_records(bytes) {
        Ok(records) => {
            tracing::debug!(input = %label, records = records.len(), "read tabular records");
            Ok(RecordBatch {
                format: DataFormat::Tabular,
                records,
            })
        }
        Err(csv_error) => Err(failure(format!(
            "not JSON ({json_error}) and not delimited text ({csv_error})"
        ))),
    }
}

fn json_records(document: Value) -> Result<Vec<DataRecord>, String> {
    match document {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(format!(
                    "array element {index} is not an object: {}",
                    json_kind(&other)
                )),
            })
            .collect(),
        Value::Object(record) => Ok(vec![record]),
        other => Err(format!(
            "top-level JSON value must be an array or an object, found {}",
            json_kind(&other)
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse delimited text.
///
/// Empty cells and cells missing from the end of a short row are omitted
/// from the record. A row with more fields than the header is an error.
fn tabular_records(bytes: &[u8]) -> Result<Vec<DataRecord>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| e.to_string())?;
        if row.len() > headers.len() {
            let line = row.position().map_or(records.len() as u64 + 2, |p| p.line());
            return Err(format!(
                "line {line} has {} fields but the header has {}",
                row.len(),
                headers.len()
            ));
        }
        let record: DataRecord = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_array_of_objects() {
        let batch = parse_records("d.json", br#"[{"a": 1}, {"a": 2}]"#).unwrap();
        assert_eq!(batch.format, DataFormat::Json);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[1]["a"], json!(2));
    }

    #[test]
    fn single_json_object_is_one_record() {
        let batch = parse_records("d.json", br#"{"a": "x"}"#).unwrap();
        assert_eq!(batch.records.len(), 1);
        let numbers: Vec<usize> = batch.numbered().map(|(n, _)| n).collect();
        assert_eq!(numbers, [1]);
    }

    #[test]
    fn json_scalar_is_rejected() {
        let err = parse_records("d.json", b"42").unwrap_err();
        assert!(matches!(err, DataLoadError::FormatDetection { .. }));
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn json_array_of_scalars_is_rejected() {
        let err = parse_records("d.json", b"[1, 2]").unwrap_err();
        assert!(err.to_string().contains("array element 0"));
    }

    #[test]
    fn csv_rows_skip_empty_cells_and_number_from_two() {
        let batch = parse_records("d.csv", b"sampleId,age\nS1,\n,34\n").unwrap();
        assert_eq!(batch.format, DataFormat::Tabular);
        assert_eq!(batch.records[0].len(), 1);
        assert_eq!(batch.records[0]["sampleId"], json!("S1"));
        assert!(!batch.records[1].contains_key("sampleId"));
        assert_eq!(batch.records[1]["age"], json!("34"));
        let numbers: Vec<usize> = batch.numbered().map(|(n, _)| n).collect();
        assert_eq!(numbers, [2, 3]);
    }

    #[test]
    fn short_rows_omit_missing_cells() {
        let batch = parse_records("d.csv", b"a,b,c\nx,y,z\nx,y\n").unwrap();
        assert_eq!(batch.format, DataFormat::Tabular);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0]["c"], json!("z"));
        assert_eq!(batch.records[1].len(), 2);
        assert_eq!(batch.records[1]["b"], json!("y"));
        assert!(!batch.records[1].contains_key("c"));
    }

    #[test]
    fn overlong_row_is_rejected() {
        let err = parse_records("d.csv", b"a,b\n1,2\n1,2,3\n").unwrap_err();
        match err {
            DataLoadError::FormatDetection { path, reason } => {
                assert_eq!(path, "d.csv");
                assert!(reason.contains("not JSON"), "{reason}");
                assert!(reason.contains("line 3 has 3 fields but the header has 2"), "{reason}");
            }
            other => panic!("expected FormatDetection, got {other}"),
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = parse_records("d.csv", b"  \n").unwrap_err();
        assert!(err.to_string().contains("input is empty"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_records(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Read { .. }));
    }
}
