//! # dccv-cli — Data Contributor Validation CLI
//!
//! Provides the `dccv` command-line interface over the schema, template and
//! table crates.
//!
//! ## Subcommands
//!
//! - `dccv validate` — Validate JSON or CSV data against a schema.
//! - `dccv template` — Write a manifest template with dictionary and values.
//! - `dccv table` — Create or overwrite an annotation table.
//! - `dccv schema` — Assemble a schema from dictionary and values CSVs.
//!
//! ```bash
//! dccv validate biospecimen.json samples.csv
//! dccv template biospecimen.json manifest.xlsx excel
//! dccv table --json-schema-file biospecimen.json new_table --parent-id P1 --table-name Biospecimen
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `1` validation reported violations, `2` fatal error.

pub mod config;
pub mod schema;
pub mod table;
pub mod template;
pub mod validate;

/// Exit status for fatal errors: unreadable inputs, bad schemas, store failures.
pub const EXIT_FATAL: u8 = 2;
