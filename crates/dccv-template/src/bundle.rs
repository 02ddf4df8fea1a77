//! # Template Bundle
//!
//! The three tables every template carries, independent of output format:
//! the data-entry columns, the column dictionary, and the value lists.

use std::path::Path;

use serde::Serialize;

use dccv_schema::{
    flatten, load_and_dereference, DefinitionRow, FlattenedSchema, ValueRow, DEFINITION_COLUMNS,
    VALUE_COLUMNS,
};

use crate::error::TemplateError;

/// Everything a [`crate::TemplateWriter`] needs to produce a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateBundle {
    /// Data-entry column names, in schema property order.
    pub columns: Vec<String>,
    pub definitions: Vec<DefinitionRow>,
    pub values: Vec<ValueRow>,
}

impl TemplateBundle {
    /// Build a bundle from the schema file at `path`.
    pub fn from_schema_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let schema = load_and_dereference(path)?;
        Ok(Self::from(flatten(&schema)))
    }

    /// Header row of the dictionary table.
    pub fn dictionary_header(&self) -> &'static [&'static str] {
        &DEFINITION_COLUMNS
    }

    /// Header row of the values table.
    pub fn values_header(&self) -> &'static [&'static str] {
        &VALUE_COLUMNS
    }

    /// Dictionary table body, one row of cells per definition.
    pub fn dictionary_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.definitions.iter().map(|row| row.cells().to_vec())
    }

    /// Values table body, one row of cells per value.
    pub fn value_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.values.iter().map(|row| row.cells().to_vec())
    }
}

impl From<FlattenedSchema> for TemplateBundle {
    fn from(flattened: FlattenedSchema) -> Self {
        Self {
            columns: flattened.keys().map(str::to_string).collect(),
            definitions: flattened.definitions,
            values: flattened.values,
        }
    }
}
