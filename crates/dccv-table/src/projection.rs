//! # Annotation Projection
//!
//! Joins the Definitions table with module labels and then with the Values
//! table, producing the rows of an annotation table.
//!
//! Both joins are left joins on `key`: a property with `k` values yields
//! `k` rows, a property with none yields one row with empty value fields.
//! The `type` column becomes `columnType`, upper-cased, with `NUMBER`
//! renamed to `DOUBLE`. `required` is not carried over.

use std::path::Path;

use serde::{Deserialize, Serialize};

use dccv_schema::{flatten, load_and_dereference, DereferencedSchema, FlattenedSchema};

use crate::columns::{ColumnType, ANNOTATION_COLUMNS};
use crate::error::TableStoreError;

/// One row of an annotation table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRow {
    pub key: String,
    pub description: Option<String>,
    #[serde(rename = "columnType")]
    pub column_type: Option<String>,
    #[serde(rename = "maximumSize")]
    pub maximum_size: Option<i64>,
    pub value: Option<String>,
    #[serde(rename = "valueDescription")]
    pub value_description: Option<String>,
    pub source: Option<String>,
    /// File stem of the document the property was dereferenced from.
    pub module: Option<String>,
}

impl AnnotationRow {
    /// Text cells in [`ANNOTATION_COLUMNS`] order; `None` for the numeric column.
    pub fn text_cells(&self) -> [Option<&str>; 8] {
        [
            Some(self.key.as_str()),
            self.description.as_deref(),
            self.column_type.as_deref(),
            None,
            self.value.as_deref(),
            self.value_description.as_deref(),
            self.source.as_deref(),
            self.module.as_deref(),
        ]
    }

    /// Check every bounded text cell against its column's maximum size.
    pub fn check_limits(&self, row: usize) -> Result<(), TableStoreError> {
        for (column, cell) in ANNOTATION_COLUMNS.iter().zip(self.text_cells()) {
            let (Some(limit), Some(text)) = (column.maximum_size, cell) else {
                continue;
            };
            if column.column_type != ColumnType::String {
                continue;
            }
            let length = text.chars().count();
            if length > limit as usize {
                return Err(TableStoreError::ColumnLimit {
                    row,
                    column: column.name.to_string(),
                    limit,
                    length,
                });
            }
        }
        Ok(())
    }
}

/// Store column type for a schema `type` label.
pub fn column_type_label(type_name: &str) -> String {
    let upper = type_name.to_uppercase();
    if upper == "NUMBER" {
        "DOUBLE".to_string()
    } else {
        upper
    }
}

/// Project a flattened schema into annotation rows.
pub fn project(schema: &DereferencedSchema, flattened: &FlattenedSchema) -> Vec<AnnotationRow> {
    let mut rows = Vec::with_capacity(flattened.definitions.len().max(flattened.values.len()));

    for definition in &flattened.definitions {
        let base = AnnotationRow {
            key: definition.key.clone(),
            description: definition.description.clone(),
            column_type: definition.type_name.as_deref().map(column_type_label),
            maximum_size: definition.maximum_size,
            module: schema.module_label(&definition.key),
            ..AnnotationRow::default()
        };

        let before = rows.len();
        for value in flattened.values_for(&definition.key) {
            rows.push(AnnotationRow {
                value: value.value.as_ref().map(|_| value.value_text()),
                value_description: value.value_description.clone(),
                source: value.source.clone(),
                ..base.clone()
            });
        }
        if rows.len() == before {
            rows.push(base);
        }
    }

    tracing::debug!(rows = rows.len(), "projected annotation rows");
    rows
}

/// Load, dereference, flatten and project the schema at `path`.
pub fn annotation_rows(path: impl AsRef<Path>) -> Result<Vec<AnnotationRow>, TableStoreError> {
    let schema = load_and_dereference(path)?;
    let flattened = flatten(&schema);
    Ok(project(&schema, &flattened))
}
