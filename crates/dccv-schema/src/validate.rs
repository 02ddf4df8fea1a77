//! # Record Validation
//!
//! Runs every record of a data object through the coercion pipeline and a
//! compiled Draft-7 validator, collecting every violation instead of
//! stopping at the first one.
//!
//! ## Pipeline
//!
//! JSON records:
//!
//! 1. Drop null values.
//! 2. Narrow typed values towards string constants, unless a typed entry of
//!    the list already admits them.
//! 3. Validate and record each violation with the record's number.
//!
//! Tabular records:
//!
//! 1. Drop null values.
//! 2. Parse cells of purely numeric/boolean properties.
//! 3. Narrow typed values towards string constants.
//! 4. Widen strings towards numeric, then boolean, typed entries.
//! 5. Validate and record each violation with the record's number.
//!
//! ## Report Format
//!
//! One line per violation, prefixed by its [`ViolationKind`]. A
//! [`ViolationKind::Property`] violation, including a missing top-level
//! `required` property, renders as `Record N: <property>: <message>`. A
//! [`ViolationKind::Relational`] one renders as `Record N: <message>`.
//! An empty report means every record is valid.

use std::fmt;
use std::path::Path;

use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value;

use dccv_core::{strip_nulls, DataRecord, DccvError, SchemaError};

use crate::coerce::{
    narrow_json_record, narrow_record, type_tabular_record, widen_record, WidenTarget,
};
use crate::deref::{load_and_dereference, DereferencedSchema};
use crate::input::{read_records, DataFormat, RecordBatch};
use crate::loader::LocalRetriever;

/// How a violation relates to the record's properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A single property is at fault: wrong type, pattern or value, or a
    /// top-level required property is missing.
    Property { property: String },
    /// A cross-property rule failed with no single property to blame.
    Relational,
}

/// One validation failure of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Display number of the record (1-based for JSON, 2-based for tabular).
    pub record_number: usize,
    pub kind: ViolationKind,
    /// JSON Pointer into the schema.
    pub schema_path: String,
    /// JSON Pointer into the record.
    pub instance_path: String,
    /// Validator message.
    pub message: String,
}

impl Violation {
    /// The property at fault, if any.
    pub fn property(&self) -> Option<&str> {
        match &self.kind {
            ViolationKind::Property { property } => Some(property.as_str()),
            ViolationKind::Relational => None,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.property() {
            Some(property) => write!(
                f,
                "Record {}: {}: {}",
                self.record_number, property, self.message
            ),
            None => write!(f, "Record {}: {}", self.record_number, self.message),
        }
    }
}

/// Split a JSON Pointer into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// All violations of one data object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
    records: usize,
}

impl ValidationReport {
    /// True when no record produced a violation.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of records that were checked.
    pub fn records_checked(&self) -> usize {
        self.records
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// A dereferenced schema paired with its compiled validator.
pub struct RecordValidator {
    schema: DereferencedSchema,
    validator: Validator,
}

impl fmt::Debug for RecordValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordValidator")
            .field("schema", &self.schema.source().as_str())
            .finish_non_exhaustive()
    }
}

impl RecordValidator {
    /// Compile a Draft-7 validator for `schema`.
    ///
    /// References left in the dereferenced document resolve against the
    /// schema's own URI and never touch the network.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] if the document does not compile.
    pub fn new(schema: DereferencedSchema) -> Result<Self, SchemaError> {
        let mut document = schema.document().clone();
        if let Value::Object(root) = &mut document {
            root.entry("$id")
                .or_insert_with(|| Value::String(schema.source().to_string()));
        }

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft7);
        opts.with_retriever(LocalRetriever::new(schema.base_dir()));

        let validator = opts
            .build(&document)
            .map_err(|e| SchemaError::load(schema.source().as_str(), e.to_string()))?;

        Ok(Self { schema, validator })
    }

    /// Load, dereference and compile the schema at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        Self::new(load_and_dereference(path)?)
    }

    pub fn schema(&self) -> &DereferencedSchema {
        &self.schema
    }

    /// Apply the coercion pipeline to one raw record.
    ///
    /// JSON strings are never widened: a `"12"` where the schema wants an
    /// integer is reported, not repaired.
    pub fn prepare(&self, record: &DataRecord, format: DataFormat) -> DataRecord {
        let stripped = strip_nulls(record);
        match format {
            DataFormat::Json => narrow_json_record(&stripped, &self.schema),
            DataFormat::Tabular => {
                let typed = type_tabular_record(&stripped, &self.schema);
                let mut prepared = narrow_record(&typed, &self.schema);
                for target in WidenTarget::PIPELINE {
                    prepared = widen_record(&prepared, &self.schema, target);
                }
                prepared
            }
        }
    }

    /// Validate one already-prepared record.
    pub fn validate_record(&self, record: &DataRecord, record_number: usize) -> Vec<Violation> {
        let instance = Value::Object(record.clone());
        self.validator
            .iter_errors(&instance)
            .map(|e| {
                let schema_path = e.schema_path.to_string();
                let instance_path = e.instance_path.to_string();
                let kind = classify(&e.kind, &schema_path, &instance_path);
                Violation {
                    record_number,
                    kind,
                    schema_path,
                    instance_path,
                    message: e.to_string(),
                }
            })
            .collect()
    }

    /// Prepare and validate every record of a batch.
    pub fn validate_batch(&self, batch: &RecordBatch) -> ValidationReport {
        let mut report = ValidationReport::default();
        for (number, record) in batch.numbered() {
            let prepared = self.prepare(record, batch.format);
            report.violations.extend(self.validate_record(&prepared, number));
            report.records += 1;
        }
        tracing::info!(
            records = report.records,
            violations = report.violations.len(),
            "validated records"
        );
        report
    }

    /// Read the data object at `path` and validate it.
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Result<ValidationReport, DccvError> {
        let batch = read_records(path.as_ref())?;
        Ok(self.validate_batch(&batch))
    }
}

/// Validate the data object at `data` against the schema at `schema`.
pub fn validate_data_file(
    schema: impl AsRef<Path>,
    data: impl AsRef<Path>,
) -> Result<ValidationReport, DccvError> {
    RecordValidator::from_path(schema)?.validate_file(data)
}

fn classify(kind: &ValidationErrorKind, schema_path: &str, instance_path: &str) -> ViolationKind {
    let schema_segments = pointer_segments(schema_path);
    if let [first, name, ..] = schema_segments.as_slice() {
        if first == "properties" {
            return ViolationKind::Property {
                property: name.clone(),
            };
        }
    }

    if let ValidationErrorKind::Required { property } = kind {
        if schema_segments == ["required"] {
            let property = match property {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return ViolationKind::Property { property };
        }
    }

    match pointer_segments(instance_path).into_iter().next() {
        Some(property) => ViolationKind::Property { property },
        None => ViolationKind::Relational,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_records;
    use serde_json::json;

    fn validator(document: Value) -> RecordValidator {
        RecordValidator::new(DereferencedSchema::from_value(document).unwrap()).unwrap()
    }

    fn status_validator() -> RecordValidator {
        validator(json!({
            "type": "object",
            "properties": {
                "sampleId": {"type": "string"},
                "status": {"anyOf": [
                    {"const": "true"},
                    {"const": "false"},
                    {"const": "Unknown"}
                ]},
                "age": {"type": "integer"}
            },
            "required": ["sampleId"]
        }))
    }

    #[test]
    fn narrowed_boolean_matches_string_constant() {
        let v = status_validator();
        let batch = parse_records("d.json", br#"[{"sampleId": "S1", "status": true}]"#).unwrap();
        let report = v.validate_batch(&batch);
        assert!(report.is_valid(), "{report}");
        assert_eq!(report.records_checked(), 1);
    }

    #[test]
    fn property_violation_names_property() {
        let v = status_validator();
        let batch = parse_records("d.json", br#"[{"sampleId": "S1", "status": "maybe"}]"#).unwrap();
        let report = v.validate_batch(&batch);
        assert!(!report.is_valid());
        let first = &report.violations()[0];
        assert_eq!(first.kind, ViolationKind::Property { property: "status".into() });
        assert!(first.to_string().starts_with("Record 1: status: "), "{first}");
    }

    #[test]
    fn missing_required_column_in_tabular_input() {
        let v = status_validator();
        let batch = parse_records("d.csv", b"sampleId,age\nS1,4\n,5\n").unwrap();
        let report = v.validate_batch(&batch);
        assert_eq!(report.len(), 1, "{report}");
        let violation = &report.violations()[0];
        assert_eq!(violation.record_number, 3);
        assert_eq!(violation.kind, ViolationKind::Property { property: "sampleId".into() });
        let line = violation.to_string();
        assert!(line.starts_with("Record 3: "), "{line}");
        assert!(line.contains("sampleId"), "{line}");
    }

    #[test]
    fn tabular_integers_are_typed_before_validation() {
        let v = status_validator();
        let batch = parse_records("d.csv", b"sampleId,age\nS1,4\nS2,four\n").unwrap();
        let report = v.validate_batch(&batch);
        assert_eq!(report.len(), 1, "{report}");
        assert_eq!(report.violations()[0].record_number, 3);
        assert!(report.to_string().starts_with("Record 3: age: "));
    }

    #[test]
    fn nulls_count_as_absent() {
        let v = status_validator();
        let batch = parse_records("d.json", br#"{"sampleId": "S1", "age": null}"#).unwrap();
        assert!(v.validate_batch(&batch).is_valid());
    }

    #[test]
    fn conditional_requirement_is_relational() {
        let v = validator(json!({
            "type": "object",
            "properties": {
                "diagnosis": {"type": "string"},
                "diagnosisAge": {"type": "integer"}
            },
            "if": {"properties": {"diagnosis": {"const": "yes"}}, "required": ["diagnosis"]},
            "then": {"required": ["diagnosisAge"]}
        }));
        let batch = parse_records("d.json", br#"[{"diagnosis": "no"}, {"diagnosis": "yes"}]"#).unwrap();
        let report = v.validate_batch(&batch);
        assert_eq!(report.len(), 1, "{report}");
        let violation = &report.violations()[0];
        assert_eq!(violation.kind, ViolationKind::Relational);
        assert_eq!(violation.record_number, 2);
        assert!(violation.to_string().starts_with("Record 2: "));
        assert!(!violation.to_string().starts_with("Record 2: diagnosisAge: "));
    }

    fn count_validator() -> RecordValidator {
        validator(json!({
            "type": "object",
            "properties": {
                "count": {"anyOf": [{"const": "Not collected"}, {"type": "integer"}]}
            }
        }))
    }

    #[test]
    fn json_digit_string_is_not_widened() {
        let v = count_validator();
        let batch = parse_records("d.json", br#"[{"count": "12"}]"#).unwrap();
        let report = v.validate_batch(&batch);
        assert_eq!(report.len(), 1, "{report}");
        assert!(report.to_string().starts_with("Record 1: count: "), "{report}");
    }

    #[test]
    fn json_integers_past_i64_are_valid() {
        let v = count_validator();
        let batch = parse_records(
            "d.json",
            br#"[{"count": 10000000000000000000}, {"count": 12}, {"count": "Not collected"}]"#,
        )
        .unwrap();
        let report = v.validate_batch(&batch);
        assert!(report.is_valid(), "{report}");
        assert_eq!(report.records_checked(), 3);
    }

    #[test]
    fn tabular_digit_cells_past_i64_are_valid() {
        let v = count_validator();
        let batch = parse_records("d.csv", b"count
10000000000000000000
12
").unwrap();
        let report = v.validate_batch(&batch);
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn missing_required_line_names_property_like_json_report() {
        let v = status_validator();
        let batch = parse_records("d.json", br#"[{"age": 3}]"#).unwrap();
        let report = v.validate_batch(&batch);
        assert_eq!(report.len(), 1, "{report}");
        let violation = &report.violations()[0];
        assert_eq!(violation.property(), Some("sampleId"));
        assert!(violation.to_string().starts_with("Record 1: sampleId: "), "{violation}");

        let json = serde_json::to_value(violation).unwrap();
        assert_eq!(json["kind"]["kind"], "property");
        assert_eq!(json["kind"]["property"], "sampleId");
    }

    #[test]
    fn report_lines_are_newline_terminated() {
        let v = status_validator();
        let batch = parse_records("d.json", br#"[{"age": "x"}]"#).unwrap();
        let text = v.validate_batch(&batch).to_string();
        assert_eq!(text.lines().count(), 2, "{text}");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn pointer_segments_unescape() {
        assert_eq!(pointer_segments("/properties/a~1b/x~0y"), ["properties", "a/b", "x~y"]);
        assert!(pointer_segments("").is_empty());
    }

    #[test]
    fn uncompilable_schema_is_load_error() {
        let schema = DereferencedSchema::from_value(json!({
            "properties": {"a": {"type": "not-a-type"}}
        }))
        .unwrap();
        let err = RecordValidator::new(schema).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoad { .. }));
    }
}
