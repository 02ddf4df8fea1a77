//! # Table Store Capability
//!
//! The narrow interface the annotation workflows need from a table backend:
//! create a table, and the query/delete/append primitives an overwrite is
//! built from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::columns::ColumnSpec;
use crate::error::TableStoreError;
use crate::projection::AnnotationRow;

/// Identifier of a stored table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to create: where, under which name, with which columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Identifier of the container the table is created under.
    pub parent: String,
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    /// Reject empty names and duplicate column names.
    pub fn check(&self) -> Result<(), TableStoreError> {
        let invalid = |reason: String| Err(TableStoreError::InvalidSpec { reason });
        if self.parent.trim().is_empty() {
            return invalid("parent identifier is empty".into());
        }
        if self.name.trim().is_empty() {
            return invalid("table name is empty".into());
        }
        for (index, column) in self.columns.iter().enumerate() {
            if self.columns[..index].iter().any(|c| c.name == column.name) {
                return invalid(format!("duplicate column '{}'", column.name));
            }
        }
        Ok(())
    }
}

/// Outcome of [`TableStore::overwrite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverwriteSummary {
    /// Rows removed from the table.
    pub deleted: usize,
    /// Rows written in their place.
    pub stored: usize,
}

/// Capability for creating and rewriting annotation tables.
///
/// Calls are synchronous and never retried: the first failure aborts.
pub trait TableStore {
    /// Create a table and store its initial rows.
    fn create(&mut self, spec: &TableSpec, rows: &[AnnotationRow]) -> Result<TableId, TableStoreError>;

    /// Fetch a table's specification, failing if it does not exist.
    fn describe(&self, id: &TableId) -> Result<TableSpec, TableStoreError>;

    /// Identifiers of every row currently in the table.
    fn query_row_ids(&self, id: &TableId) -> Result<Vec<u64>, TableStoreError>;

    /// Delete the given rows, returning how many were removed.
    fn delete_rows(&mut self, id: &TableId, row_ids: &[u64]) -> Result<usize, TableStoreError>;

    /// Append rows, returning how many were stored.
    fn append_rows(&mut self, id: &TableId, rows: &[AnnotationRow]) -> Result<usize, TableStoreError>;

    /// Replace every row of an existing table.
    fn overwrite(&mut self, id: &TableId, rows: &[AnnotationRow]) -> Result<OverwriteSummary, TableStoreError> {
        let spec = self.describe(id)?;
        let existing = self.query_row_ids(id)?;
        let deleted = self.delete_rows(id, &existing)?;
        let stored = self.append_rows(id, rows)?;
        tracing::info!(table = %id, name = %spec.name, deleted, stored, "overwrote table");
        Ok(OverwriteSummary { deleted, stored })
    }
}
