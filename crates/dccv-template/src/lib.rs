//! # dccv-template — Data-Entry Templates
//!
//! Turns a flattened schema into the files a data contributor fills in:
//! a blank template, a dictionary describing each column, and the value
//! lists for controlled columns.
//!
//! Output formats sit behind the [`TemplateWriter`] capability:
//!
//! - [`CsvTemplateWriter`]: three sibling CSV files.
//! - [`WorkbookTemplateWriter`]: one workbook with three worksheets.
//!
//! ## Crate Policy
//!
//! - Writers only format. All schema interpretation happens in `dccv-schema`.

pub mod bundle;
pub mod delimited;
pub mod error;
pub mod workbook;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use bundle::TemplateBundle;
pub use delimited::CsvTemplateWriter;
pub use error::TemplateError;
pub use workbook::{WorkbookTemplateWriter, SHEET_NAMES};

/// Capability for rendering a [`TemplateBundle`] to disk.
pub trait TemplateWriter {
    /// Write the bundle using `output` as the target path, returning every
    /// file created.
    fn write(&self, output: &Path, bundle: &TemplateBundle) -> Result<Vec<PathBuf>, TemplateError>;
}

/// Template output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Csv,
    Excel,
}

impl OutputKind {
    /// The writer for this format.
    pub fn writer(self) -> Box<dyn TemplateWriter> {
        match self {
            Self::Csv => Box::new(CsvTemplateWriter),
            Self::Excel => Box::new(WorkbookTemplateWriter),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            _ => Err(TemplateError::UnknownOutputKind(s.to_string())),
        }
    }
}

/// Build a template from the schema at `schema` and write it as `kind`.
pub fn generate_template(
    schema: impl AsRef<Path>,
    output: impl AsRef<Path>,
    kind: OutputKind,
) -> Result<Vec<PathBuf>, TemplateError> {
    let bundle = TemplateBundle::from_schema_file(schema)?;
    kind.writer().write(output.as_ref(), &bundle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_kind_parses_case_insensitively() {
        assert_eq!("CSV".parse::<OutputKind>().unwrap(), OutputKind::Csv);
        assert_eq!("excel".parse::<OutputKind>().unwrap(), OutputKind::Excel);
        let err = "pdf".parse::<OutputKind>().unwrap_err();
        assert!(err.to_string().contains("'pdf'"));
    }

    #[test]
    fn output_kind_display_round_trips() {
        for kind in [OutputKind::Csv, OutputKind::Excel] {
            assert_eq!(kind.to_string().parse::<OutputKind>().unwrap(), kind);
        }
    }
}
