//! # Validate Subcommand
//!
//! Validates a JSON or CSV data object against a schema and prints one line
//! per violation to stdout. Empty output means the data is valid.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use dccv_schema::{RecordValidator, ValidationReport};

/// Report rendering on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// `Record N: property: message` lines.
    #[default]
    Text,
    /// A JSON array of violation objects.
    Json,
}

/// Arguments for the `dccv validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON Schema file (JSON or YAML).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Data file to validate: JSON records or CSV with a header row.
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every record is valid, 1 when any violation
/// was reported.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let validator = RecordValidator::from_path(&args.schema)
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;
    let report = validator
        .validate_file(&args.data)
        .with_context(|| format!("failed to validate {}", args.data.display()))?;

    print!("{}", render_report(&report, args.format)?);

    tracing::info!(
        records = report.records_checked(),
        violations = report.len(),
        "validation finished"
    );
    Ok(if report.is_valid() { 0 } else { 1 })
}

/// Render a report for stdout.
pub fn render_report(report: &ValidationReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(report.to_string()),
        ReportFormat::Json => {
            let mut text = serde_json::to_string_pretty(report.violations())
                .context("failed to serialize violations")?;
            text.push('\n');
            Ok(text)
        }
    }
}
