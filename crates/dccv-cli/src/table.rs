//! # Table Subcommand
//!
//! Publishes a schema's annotation rows to the table store, either as a new
//! table or by replacing the rows of an existing one.
//!
//! ```text
//! dccv table --json-schema-file schema.json new_table --parent-id P --table-name N
//! dccv table --json-schema-file schema.json overwrite_table --table-id tbl-...
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use dccv_table::{create_annotation_table, overwrite_annotation_table, StoreSession, TableId};

/// Arguments for the `dccv table` subcommand.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// JSON Schema file the annotation rows are derived from.
    #[arg(long, alias = "json_schema_file", value_name = "SCHEMA")]
    pub json_schema_file: PathBuf,

    #[command(subcommand)]
    pub action: TableAction,
}

/// What to do with the derived rows.
#[derive(Subcommand, Debug)]
pub enum TableAction {
    /// Create a new annotation table.
    #[command(name = "new_table")]
    NewTable {
        /// Identifier of the container the table is created in.
        #[arg(long, alias = "parent_synapse_id")]
        parent_id: String,

        /// Name of the new table.
        #[arg(long, alias = "synapse_table_name")]
        table_name: String,
    },

    /// Replace every row of an existing annotation table.
    #[command(name = "overwrite_table")]
    OverwriteTable {
        /// Identifier of the table to overwrite.
        #[arg(long, alias = "table_synapse_id")]
        table_id: String,
    },
}

/// Execute the table subcommand against an open store session.
pub fn run_table(args: &TableArgs, session: &mut StoreSession) -> Result<u8> {
    let schema = &args.json_schema_file;
    match &args.action {
        TableAction::NewTable {
            parent_id,
            table_name,
        } => {
            let id = create_annotation_table(session.store(), schema, parent_id, table_name)
                .with_context(|| format!("failed to create table from {}", schema.display()))?;
            println!("{id}");
        }
        TableAction::OverwriteTable { table_id } => {
            let id = TableId::new(table_id.as_str());
            let summary = overwrite_annotation_table(session.store(), schema, &id)
                .with_context(|| format!("failed to overwrite table {id}"))?;
            println!(
                "{id}: deleted {} rows, stored {} rows",
                summary.deleted, summary.stored
            );
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dccv_table::{StoreConfig, TableStore};

    fn schema(dir: &std::path::Path, body: &str) -> PathBuf {
        let path = dir.join("schema.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn new_then_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = schema(
            dir.path(),
            r#"{"properties": {"a": {"type": "string"}, "b": {"type": "number"}}}"#,
        );
        let mut session = StoreSession::open(&StoreConfig::new(dir.path().join("store"))).unwrap();

        let args = TableArgs {
            json_schema_file: schema_path.clone(),
            action: TableAction::NewTable {
                parent_id: "project-1".into(),
                table_name: "Annotations".into(),
            },
        };
        assert_eq!(run_table(&args, &mut session).unwrap(), 0);

        let table = std::fs::read_dir(dir.path().join("store"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .find(|p| p.extension().is_some_and(|x| x == "json"))
            .unwrap();
        let table_id = table.file_stem().unwrap().to_string_lossy().into_owned();

        schema(dir.path(), r#"{"properties": {"a": {"type": "string"}}}"#);
        let args = TableArgs {
            json_schema_file: schema_path,
            action: TableAction::OverwriteTable {
                table_id: table_id.clone(),
            },
        };
        assert_eq!(run_table(&args, &mut session).unwrap(), 0);
        let ids = session
            .store()
            .query_row_ids(&TableId::new(table_id))
            .unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn overwrite_unknown_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = StoreSession::open(&StoreConfig::new(dir.path().join("store"))).unwrap();
        let args = TableArgs {
            json_schema_file: schema(dir.path(), r#"{"properties": {}}"#),
            action: TableAction::OverwriteTable {
                table_id: "tbl-missing".into(),
            },
        };
        let err = run_table(&args, &mut session).unwrap_err();
        assert!(format!("{err:#}").contains("tbl-missing"));
    }
}
