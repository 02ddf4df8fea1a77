//! # Template Subcommand
//!
//! Writes a blank manifest template for a schema, along with its data
//! dictionary and allowed-values tables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use dccv_template::{generate_template, OutputKind};

/// Arguments for the `dccv template` subcommand.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// JSON Schema file (JSON or YAML).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Output path. CSV output derives three sibling files from it.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Output format: `csv` or `excel`.
    #[arg(value_name = "KIND")]
    pub kind: OutputKind,
}

/// Execute the template subcommand. Prints each written path.
pub fn run_template(args: &TemplateArgs) -> Result<u8> {
    let written = generate_template(&args.schema, &args.output, args.kind).with_context(|| {
        format!(
            "failed to write {} template for {}",
            args.kind,
            args.schema.display()
        )
    })?;

    for path in &written {
        println!("{}", path.display());
    }
    tracing::info!(kind = %args.kind, files = written.len(), "template written");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("schema.json");
        std::fs::write(
            &path,
            r#"{"properties": {"sampleId": {"type": "string"}, "sex": {"enum": ["male", "female"]}}}"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn csv_template_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let args = TemplateArgs {
            schema: schema(dir.path()),
            output: dir.path().join("manifest.csv"),
            kind: OutputKind::Csv,
        };
        assert_eq!(run_template(&args).unwrap(), 0);
        for name in [
            "manifest_template.csv",
            "manifest_dictionary.csv",
            "manifest_values.csv",
        ] {
            assert!(dir.path().join(name).is_file(), "{name} missing");
        }
    }

    #[test]
    fn excel_template_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("manifest.xlsx");
        let args = TemplateArgs {
            schema: schema(dir.path()),
            output: output.clone(),
            kind: OutputKind::Excel,
        };
        assert_eq!(run_template(&args).unwrap(), 0);
        assert!(output.is_file());
    }

    #[test]
    fn missing_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = TemplateArgs {
            schema: dir.path().join("absent.json"),
            output: dir.path().join("out.csv"),
            kind: OutputKind::Csv,
        };
        assert!(run_template(&args).is_err());
    }
}
