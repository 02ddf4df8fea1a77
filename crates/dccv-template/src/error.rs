//! Errors raised while producing template files.

use thiserror::Error;

use dccv_core::SchemaError;

/// Errors from template generation.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The schema feeding the template could not be loaded.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A template file could not be created or written.
    #[error("failed to write {path}: {reason}")]
    Write {
        /// Path of the file being written.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The requested output kind is not supported.
    #[error("unknown output kind '{0}' (expected 'csv' or 'excel')")]
    UnknownOutputKind(String),
}

impl TemplateError {
    pub(crate) fn write(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Self::Write {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
