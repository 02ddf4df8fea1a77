//! # Error Hierarchy
//!
//! Structured error types for the whole workspace, built with `thiserror`.
//!
//! Schema and reference errors are fatal: a run that hits one produces no
//! partial output. Per-record validation problems are not errors at all;
//! they are collected as violations by the record validator.

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum DccvError {
    /// The schema could not be loaded, parsed, or dereferenced.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The data object to validate could not be loaded.
    #[error("data error: {0}")]
    Data(#[from] DataLoadError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading, parsing, or dereferencing a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document is malformed or has the wrong shape.
    #[error("failed to load schema {path}: {reason}")]
    SchemaLoad {
        /// Path or URI of the schema document.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// A property declares more than one value-list keyword.
    #[error("property '{property}' declares more than one value-list keyword ({keywords})")]
    AmbiguousValueList {
        /// The offending property.
        property: String,
        /// The keywords found on it, comma separated.
        keywords: String,
    },

    /// A `$ref` target could not be located.
    #[error("cannot resolve $ref '{reference}' of property '{property}': {reason}")]
    ReferenceResolution {
        /// The property whose definition is a `$ref`.
        property: String,
        /// The raw reference string.
        reference: String,
        /// Human-readable reason for the failure.
        reason: String,
    },
}

impl SchemaError {
    /// Shorthand for a [`SchemaError::SchemaLoad`] error.
    pub fn load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading the data object to validate.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// The file could not be read.
    #[error("failed to read {path}: {reason}")]
    Read {
        /// Path to the data file.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The input is neither valid JSON nor parseable delimited text.
    #[error("cannot detect the format of {path}: {reason}")]
    FormatDetection {
        /// Path (or label) of the input.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_load_display_names_path() {
        let err = SchemaError::load("schemas/main.json", "expected an object");
        assert_eq!(
            err.to_string(),
            "failed to load schema schemas/main.json: expected an object"
        );
    }

    #[test]
    fn reference_error_display() {
        let err = SchemaError::ReferenceResolution {
            property: "sex".into(),
            reference: "defs.json#/definitions/Sex".into(),
            reason: "file not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("defs.json#/definitions/Sex"));
        assert!(msg.contains("'sex'"));
    }

    #[test]
    fn umbrella_wraps_schema_error() {
        let err: DccvError = SchemaError::AmbiguousValueList {
            property: "status".into(),
            keywords: "anyOf, enum".into(),
        }
        .into();
        assert!(err.to_string().starts_with("schema error:"));
    }

    #[test]
    fn format_detection_display() {
        let err = DataLoadError::FormatDetection {
            path: "data.txt".into(),
            reason: "empty input".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot detect the format of data.txt: empty input"
        );
    }
}
