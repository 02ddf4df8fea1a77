//! # Annotation Table Columns
//!
//! The fixed column set of an annotation table.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    /// Bounded text; requires a maximum size.
    String,
    /// Floating-point number.
    Double,
    /// Unbounded text.
    LargeText,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "STRING",
            Self::Double => "DOUBLE",
            Self::LargeText => "LARGETEXT",
        })
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: Cow<'static, str>,
    #[serde(rename = "columnType")]
    pub column_type: ColumnType,
    #[serde(rename = "maximumSize", default, skip_serializing_if = "Option::is_none")]
    pub maximum_size: Option<u32>,
}

impl ColumnSpec {
    const fn text(name: &'static str, maximum_size: u32) -> Self {
        Self {
            name: Cow::Borrowed(name),
            column_type: ColumnType::String,
            maximum_size: Some(maximum_size),
        }
    }

    const fn unbounded(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name: Cow::Borrowed(name),
            column_type,
            maximum_size: None,
        }
    }
}

/// Columns of every annotation table, in storage order.
pub const ANNOTATION_COLUMNS: [ColumnSpec; 8] = [
    ColumnSpec::text("key", 100),
    ColumnSpec::text("description", 250),
    ColumnSpec::text("columnType", 50),
    ColumnSpec::unbounded("maximumSize", ColumnType::Double),
    ColumnSpec::text("value", 250),
    ColumnSpec::unbounded("valueDescription", ColumnType::LargeText),
    ColumnSpec::text("source", 250),
    ColumnSpec::text("module", 100),
];

/// [`ANNOTATION_COLUMNS`] as an owned list.
pub fn annotation_columns() -> Vec<ColumnSpec> {
    ANNOTATION_COLUMNS.to_vec()
}
