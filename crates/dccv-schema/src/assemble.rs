//! # Schema Assembly
//!
//! Builds a Draft-7 object schema from Definitions and Values rows, the
//! inverse of [`crate::flatten`]. Used to author a schema in a spreadsheet
//! and render it with [`crate::emit::render_schema`].

use std::collections::HashSet;
use std::io::Read;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use dccv_core::SchemaError;

use crate::flatten::{DefinitionRow, ValueRow};

/// Metaschema URI written into assembled schemas.
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Assemble a schema from flattened rows.
///
/// A property whose only value row has no description, no source, and a
/// value starting with `^` becomes a `pattern`; any other value rows become
/// `anyOf` entries of `{const, description?, source?}`.
///
/// # Errors
///
/// Returns [`SchemaError::SchemaLoad`] on duplicate definition keys or on a
/// value row whose key has no definition.
pub fn assemble_schema(
    definitions: &[DefinitionRow],
    values: &[ValueRow],
) -> Result<Value, SchemaError> {
    let mut seen = HashSet::new();
    for row in definitions {
        if !seen.insert(row.key.as_str()) {
            return Err(SchemaError::load(
                "definitions",
                format!("duplicate key '{}'", row.key),
            ));
        }
    }

    let mut grouped: IndexMap<&str, Vec<&ValueRow>> = IndexMap::new();
    for row in values {
        if !seen.contains(row.key.as_str()) {
            return Err(SchemaError::load(
                "values",
                format!("value row for undefined key '{}'", row.key),
            ));
        }
        grouped.entry(row.key.as_str()).or_default().push(row);
    }

    let mut properties = Map::new();
    let mut required = Vec::new();
    for row in definitions {
        let rows = grouped.get(row.key.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        properties.insert(row.key.clone(), property_schema(row, rows));
        if row.required {
            required.push(Value::String(row.key.clone()));
        }
    }

    let mut schema = Map::new();
    schema.insert("$schema".into(), Value::String(DRAFT_07.into()));
    schema.insert("type".into(), Value::String("object".into()));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }

    tracing::info!(
        properties = definitions.len(),
        values = values.len(),
        "assembled schema"
    );
    Ok(Value::Object(schema))
}

fn property_schema(definition: &DefinitionRow, values: &[&ValueRow]) -> Value {
    let mut node = Map::new();
    if let Some(type_name) = &definition.type_name {
        let types: Vec<&str> = type_name
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        match types.as_slice() {
            [] => {}
            [one] => {
                node.insert("type".into(), Value::String((*one).to_string()));
            }
            many => {
                node.insert(
                    "type".into(),
                    Value::Array(many.iter().map(|t| Value::String((*t).to_string())).collect()),
                );
            }
        }
    }
    if let Some(description) = &definition.description {
        node.insert("description".into(), Value::String(description.clone()));
    }
    if let Some(size) = definition.maximum_size {
        node.insert("maximumSize".into(), Value::from(size));
    }

    match values {
        [] => {}
        [only] if is_pattern_row(only) => {
            node.insert("pattern".into(), Value::String(only.value_text()));
        }
        rows => {
            let entries = rows.iter().copied().map(any_of_entry).collect();
            node.insert("anyOf".into(), Value::Array(entries));
        }
    }
    Value::Object(node)
}

fn is_pattern_row(row: &ValueRow) -> bool {
    row.value_description.is_none()
        && row.source.is_none()
        && row.value_text().starts_with('^')
}

fn any_of_entry(row: &ValueRow) -> Value {
    let mut entry = Map::new();
    entry.insert("const".into(), row.value.clone().unwrap_or(Value::Null));
    if let Some(description) = &row.value_description {
        entry.insert("description".into(), Value::String(description.clone()));
    }
    if let Some(source) = &row.source {
        entry.insert("source".into(), Value::String(source.clone()));
    }
    Value::Object(entry)
}

/// Read Definitions rows from CSV with a `key,type,description,required,maximumSize` header.
///
/// Only `key` is mandatory; columns are matched by name. Empty cells are
/// unset, `required` is true for a case-insensitive `true`.
pub fn read_definition_rows(label: &str, reader: impl Read) -> Result<Vec<DefinitionRow>, SchemaError> {
    let table = Table::read(label, reader)?;
    let key = table.column("key")?;
    let type_name = table.optional_column("type");
    let description = table.optional_column("description");
    let required = table.optional_column("required");
    let maximum_size = table.optional_column("maximumSize");

    table
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| -> Result<DefinitionRow, SchemaError> {
            let maximum_size = match cell(row, maximum_size) {
                None => None,
                Some(text) => Some(parse_size(text).ok_or_else(|| {
                    SchemaError::load(
                        label,
                        format!("row {}: maximumSize '{text}' is not an integer", index + 2),
                    )
                })?),
            };
            Ok(DefinitionRow {
                key: cell(row, Some(key)).unwrap_or_default().to_string(),
                type_name: cell(row, type_name).map(str::to_string),
                description: cell(row, description).map(str::to_string),
                required: cell(row, required).is_some_and(|v| v.eq_ignore_ascii_case("true")),
                maximum_size,
            })
        })
        .collect()
}

/// Read Values rows from CSV with a `key,value,valueDescription,source` header.
///
/// Values are kept as strings.
pub fn read_value_rows(label: &str, reader: impl Read) -> Result<Vec<ValueRow>, SchemaError> {
    let table = Table::read(label, reader)?;
    let key = table.column("key")?;
    let value = table.optional_column("value");
    let value_description = table.optional_column("valueDescription");
    let source = table.optional_column("source");

    Ok(table
        .rows
        .iter()
        .map(|row| ValueRow {
            key: cell(row, Some(key)).unwrap_or_default().to_string(),
            value: cell(row, value).map(|v| Value::String(v.to_string())),
            value_description: cell(row, value_description).map(str::to_string),
            source: cell(row, source).map(str::to_string),
        })
        .collect())
}

struct Table<'a> {
    label: &'a str,
    headers: csv::StringRecord,
    rows: Vec<csv::StringRecord>,
}

impl<'a> Table<'a> {
    fn read(label: &'a str, reader: impl Read) -> Result<Self, SchemaError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|e| SchemaError::load(label, e.to_string()))?
            .clone();
        let rows = csv_reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SchemaError::load(label, e.to_string()))?;
        Ok(Self { label, headers, rows })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    fn column(&self, name: &str) -> Result<usize, SchemaError> {
        self.optional_column(name)
            .ok_or_else(|| SchemaError::load(self.label, format!("missing '{name}' column")))
    }
}

fn cell(row: &csv::StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_size(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}
