//! # Schema Flattening
//!
//! Projects a dereferenced schema into two narrow relations:
//!
//! - **Definitions**: one [`DefinitionRow`] per property.
//! - **Values**: zero or more [`ValueRow`]s per property, listing either its
//!   regular expression or its controlled vocabulary.
//!
//! Downstream generators (templates, annotation tables) only ever see these
//! two row sets, never the nested schema tree.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dccv_core::{PropertyNode, ValueSource};

use crate::deref::DereferencedSchema;

/// Column order of the Definitions table.
pub const DEFINITION_COLUMNS: [&str; 5] = ["key", "type", "description", "required", "maximumSize"];

/// Column order of the Values table.
pub const VALUE_COLUMNS: [&str; 4] = ["key", "value", "valueDescription", "source"];

/// Per-property metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionRow {
    /// Property name. Unique within a table.
    pub key: String,
    /// Declared `type`, multi-type arrays joined with commas.
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub description: Option<String>,
    /// Membership in the schema's top-level `required` list.
    pub required: bool,
    #[serde(rename = "maximumSize")]
    pub maximum_size: Option<i64>,
}

impl DefinitionRow {
    /// Cells in [`DEFINITION_COLUMNS`] order. Unset fields render empty.
    pub fn cells(&self) -> [String; 5] {
        [
            self.key.clone(),
            self.type_name.clone().unwrap_or_default(),
            self.description.clone().unwrap_or_default(),
            self.required.to_string(),
            self.maximum_size.map(|n| n.to_string()).unwrap_or_default(),
        ]
    }
}

/// One allowed value (or the pattern) of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRow {
    /// Key of the owning [`DefinitionRow`].
    pub key: String,
    /// The constant, or the pattern string.
    pub value: Option<Value>,
    #[serde(rename = "valueDescription")]
    pub value_description: Option<String>,
    pub source: Option<String>,
}

impl ValueRow {
    /// The value as cell text: strings verbatim, other JSON as literal text.
    pub fn value_text(&self) -> String {
        match &self.value {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Cells in [`VALUE_COLUMNS`] order. Unset fields render empty.
    pub fn cells(&self) -> [String; 4] {
        [
            self.key.clone(),
            self.value_text(),
            self.value_description.clone().unwrap_or_default(),
            self.source.clone().unwrap_or_default(),
        ]
    }
}

/// The Definitions and Values tables of one schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlattenedSchema {
    pub definitions: Vec<DefinitionRow>,
    pub values: Vec<ValueRow>,
}

impl FlattenedSchema {
    /// Value rows belonging to `key`, in table order.
    pub fn values_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a ValueRow> + 'a {
        self.values.iter().filter(move |row| row.key == key)
    }

    /// Property keys in definition order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|row| row.key.as_str())
    }
}

/// Flatten a dereferenced schema into its Definitions and Values tables.
pub fn flatten(schema: &DereferencedSchema) -> FlattenedSchema {
    let mut flattened = FlattenedSchema::default();

    for (key, node) in schema.properties() {
        flattened.definitions.push(DefinitionRow {
            key: key.clone(),
            type_name: node.type_name.clone(),
            description: node.description.clone(),
            required: schema.is_required(key),
            maximum_size: node.maximum_size,
        });
        flattened.values.extend(value_rows(key, node));
    }

    tracing::info!(
        definitions = flattened.definitions.len(),
        values = flattened.values.len(),
        "flattened schema"
    );
    flattened
}

/// Value rows of a single property, applying pattern-over-list precedence.
pub fn value_rows(key: &str, node: &PropertyNode) -> Vec<ValueRow> {
    match node.value_source() {
        ValueSource::Pattern(pattern) => {
            if node.value_list.is_some() {
                tracing::debug!(property = %key, "pattern takes precedence over value list");
            }
            vec![ValueRow {
                key: key.to_string(),
                value: Some(Value::String(pattern.to_string())),
                value_description: None,
                source: None,
            }]
        }
        ValueSource::List(list) => list
            .entries
            .iter()
            .map(|entry| ValueRow {
                key: key.to_string(),
                value: entry.constant.clone(),
                value_description: entry.description.clone(),
                source: entry.source.clone(),
            })
            .collect(),
        ValueSource::Unconstrained => Vec::new(),
    }
}
