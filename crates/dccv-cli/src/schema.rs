//! # Schema Subcommand
//!
//! Assembles a JSON Schema from a data dictionary CSV and an allowed-values
//! CSV, the inverse of the flattening performed for templates.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use dccv_schema::{assemble_schema, read_definition_rows, read_value_rows, render_schema};

/// Arguments for the `dccv schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Dictionary CSV: key, type, description, required, maximumSize.
    #[arg(value_name = "DICTIONARY")]
    pub dictionary: PathBuf,

    /// Values CSV: key, value, valueDescription, source.
    #[arg(value_name = "VALUES")]
    pub values: PathBuf,

    /// Where the assembled schema is written.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs) -> Result<u8> {
    let definitions = {
        let label = args.dictionary.display().to_string();
        let file = File::open(&args.dictionary)
            .with_context(|| format!("failed to open dictionary {label}"))?;
        read_definition_rows(&label, file)?
    };
    let values = {
        let label = args.values.display().to_string();
        let file =
            File::open(&args.values).with_context(|| format!("failed to open values {label}"))?;
        read_value_rows(&label, file)?
    };

    let schema = assemble_schema(&definitions, &values).context("failed to assemble schema")?;
    std::fs::write(&args.output, render_schema(&schema))
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    tracing::info!(
        properties = definitions.len(),
        values = values.len(),
        output = %args.output.display(),
        "schema assembled"
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_schema_from_tables() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = dir.path().join("dictionary.csv");
        let values = dir.path().join("values.csv");
        std::fs::write(
            &dictionary,
            "key,type,description,required,maximumSize\n\
             sampleId,string,Sample identifier,true,50\n\
             sex,string,Biological sex,false,\n",
        )
        .unwrap();
        std::fs::write(
            &values,
            "key,value,valueDescription,source\n\
             sex,male,,\n\
             sex,female,,\n",
        )
        .unwrap();
        let args = SchemaArgs {
            dictionary,
            values,
            output: dir.path().join("schema.json"),
        };

        assert_eq!(run_schema(&args).unwrap(), 0);
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&args.output).unwrap()).unwrap();
        assert_eq!(written["required"], serde_json::json!(["sampleId"]));
        assert_eq!(written["properties"]["sex"]["anyOf"][1]["const"], "female");
    }

    #[test]
    fn undefined_value_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = dir.path().join("dictionary.csv");
        let values = dir.path().join("values.csv");
        std::fs::write(&dictionary, "key,type,description,required,maximumSize\na,string,,,\n").unwrap();
        std::fs::write(&values, "key,value,valueDescription,source\nb,x,,\n").unwrap();
        let args = SchemaArgs {
            dictionary,
            values,
            output: dir.path().join("schema.json"),
        };
        assert!(run_schema(&args).is_err());
        assert!(!args.output.exists());
    }
}
