//! Table store error types.

use thiserror::Error;

use dccv_core::SchemaError;

/// Errors from annotation table projection and table store operations.
///
/// Every store failure aborts the run; nothing is retried.
#[derive(Error, Debug)]
pub enum TableStoreError {
    /// The schema feeding the table could not be loaded.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// No table exists with the given identifier.
    #[error("table {id} not found")]
    NotFound {
        /// The requested table identifier.
        id: String,
    },

    /// The table specification is unusable.
    #[error("invalid table specification: {reason}")]
    InvalidSpec {
        /// Human-readable reason.
        reason: String,
    },

    /// A cell is longer than its column allows.
    #[error("row {row}: column '{column}' holds {length} characters, limit is {limit}")]
    ColumnLimit {
        /// Zero-based row index within the submitted rows.
        row: usize,
        /// Column name.
        column: String,
        /// Declared maximum size of the column.
        limit: u32,
        /// Actual length of the cell.
        length: usize,
    },

    /// The store could not be read or written.
    #[error("table store I/O failure at {path}: {reason}")]
    Io {
        /// File or directory involved.
        path: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A stored table document could not be decoded.
    #[error("table document {path} is corrupt: {reason}")]
    Corrupt {
        /// The offending document.
        path: String,
        /// Human-readable reason.
        reason: String,
    },
}

impl TableStoreError {
    pub(crate) fn io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}
