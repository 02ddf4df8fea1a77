//! # dccv CLI entry point
//!
//! Parses command-line arguments, loads configuration, initialises tracing
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dccv_cli::config::{CliConfig, LogFormat};
use dccv_cli::schema::{run_schema, SchemaArgs};
use dccv_cli::table::{run_table, TableArgs};
use dccv_cli::template::{run_template, TemplateArgs};
use dccv_cli::validate::{run_validate, ValidateArgs};
use dccv_cli::EXIT_FATAL;
use dccv_table::StoreSession;

/// Data contributor validation toolkit.
///
/// Validates tabular and JSON data against JSON Schemas, generates manifest
/// templates, publishes annotation tables and assembles schemas from
/// spreadsheets.
#[derive(Parser, Debug)]
#[command(name = "dccv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a JSON or CSV data file against a schema.
    Validate(ValidateArgs),

    /// Write a manifest template, data dictionary and allowed values.
    Template(TemplateArgs),

    /// Create or overwrite an annotation table from a schema.
    Table(TableArgs),

    /// Assemble a schema from dictionary and values CSVs.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref());
    let log_format = config
        .as_ref()
        .map(|c| c.log_format)
        .unwrap_or_default();
    init_tracing(cli.verbose, log_format);

    let result = config.and_then(|config| {
        tracing::debug!(?config, "dccv starting");
        match cli.command {
            Commands::Validate(args) => run_validate(&args),
            Commands::Template(args) => run_template(&args),
            Commands::Schema(args) => run_schema(&args),
            Commands::Table(args) => {
                let mut session = StoreSession::open(&config.store_config())
                    .context("failed to open table store")?;
                run_table(&args, &mut session)
            }
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Install the global subscriber. Without `-v`, `RUST_LOG` is honoured.
fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
