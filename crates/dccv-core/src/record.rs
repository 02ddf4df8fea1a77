//! # Data Records
//!
//! A data record is one submission row: a JSON array element or one row of
//! delimited text. Records are untyped key/value maps and are processed one
//! at a time.

use serde_json::{Map, Value};

/// One submission row, keyed by property name.
pub type DataRecord = Map<String, Value>;

/// Drop every `null` value from a record.
///
/// Absent and null are equivalent for validation purposes, which keeps
/// schemas free of `"type": ["string", "null"]` noise.
pub fn strip_nulls(record: &DataRecord) -> DataRecord {
    record
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
