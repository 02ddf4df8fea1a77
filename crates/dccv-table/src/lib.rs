//! # dccv-table — Annotation Tables
//!
//! Publishes a schema's flattened definitions and values as an annotation
//! table: one row per property/value pair with a fixed column set, tagged
//! with the module each property was dereferenced from.
//!
//! ## Components
//!
//! - [`projection`]: definitions ⋈ modules ⋈ values, as [`AnnotationRow`]s.
//! - [`columns`]: the fixed [`ANNOTATION_COLUMNS`].
//! - [`store`]: the [`TableStore`] capability.
//! - [`local`]: [`LocalTableStore`], a filesystem implementation, and the
//!   [`StoreSession`] handle the binary opens once per process.
//!
//! ## Crate Policy
//!
//! - Store failures abort the run. There is no retry or backoff.
//! - Schema processing never touches the store; workflows receive the store
//!   as an explicit argument.

pub mod columns;
pub mod error;
pub mod local;
pub mod projection;
pub mod store;

use std::path::Path;

pub use columns::{annotation_columns, ColumnSpec, ColumnType, ANNOTATION_COLUMNS};
pub use error::TableStoreError;
pub use local::{LocalTableStore, StoreConfig, StoreSession, DEFAULT_STORE_ROOT, STORE_ROOT_ENV};
pub use projection::{annotation_rows, column_type_label, project, AnnotationRow};
pub use store::{OverwriteSummary, TableId, TableSpec, TableStore};

/// Create a new annotation table under `parent` from the schema at `schema`.
pub fn create_annotation_table(
    store: &mut dyn TableStore,
    schema: impl AsRef<Path>,
    parent: &str,
    name: &str,
) -> Result<TableId, TableStoreError> {
    let rows = annotation_rows(schema)?;
    let spec = TableSpec {
        parent: parent.to_string(),
        name: name.to_string(),
        columns: annotation_columns(),
    };
    store.create(&spec, &rows)
}

/// Replace the rows of table `id` with those derived from the schema at `schema`.
pub fn overwrite_annotation_table(
    store: &mut dyn TableStore,
    schema: impl AsRef<Path>,
    id: &TableId,
) -> Result<OverwriteSummary, TableStoreError> {
    let rows = annotation_rows(schema)?;
    store.overwrite(id, &rows)
}
