//! # dccv-schema — Dereferencing, Flattening, Coercion & Validation
//!
//! The processing core of the workspace. Everything here is synchronous and
//! operates on one schema and one data object per run.
//!
//! ## Schema Side
//!
//! - [`deref`]: loads a schema and replaces `$ref` property definitions
//!   with their targets, remembering where each came from.
//! - [`flatten`]: projects the dereferenced schema into Definitions and
//!   Values rows for template and table generators.
//! - [`assemble`] and [`emit`]: the inverse direction, rows back to a
//!   schema document rendered as JSON text.
//!
//! ## Data Side
//!
//! - [`input`]: detects JSON versus delimited text and splits records.
//! - [`coerce`]: narrowing and widening passes that make flat cell values
//!   acceptable to a strictly typed validator.
//! - [`validate`]: runs the coercion pipeline and a Draft-7 validator over
//!   every record and aggregates numbered violations.
//!
//! ## Crate Policy
//!
//! - Depends only on `dccv-core` internally.
//! - Never performs network I/O: remote `$ref` URIs resolve to files in the
//!   schema's directory.
//! - Schema and reference errors are fatal. Record violations never are.

pub mod assemble;
pub mod coerce;
pub mod deref;
pub mod emit;
pub mod flatten;
pub mod input;
pub mod loader;
pub mod validate;

pub use assemble::{assemble_schema, read_definition_rows, read_value_rows, DRAFT_07};
pub use coerce::{
    admitted_by_typed_entry, narrow_json_record, narrow_record, narrow_value, string_to_bool,
    string_to_numeric, type_tabular_record, widen_record, widen_value, WidenTarget,
};
pub use deref::{load_and_dereference, DereferencedSchema, Dereferencer};
pub use emit::render_schema;
pub use flatten::{
    flatten, DefinitionRow, FlattenedSchema, ValueRow, DEFINITION_COLUMNS, VALUE_COLUMNS,
};
pub use input::{parse_records, read_records, DataFormat, RecordBatch};
pub use loader::{DocumentLoader, LocalRetriever};
pub use validate::{
    validate_data_file, RecordValidator, ValidationReport, Violation, ViolationKind,
};
