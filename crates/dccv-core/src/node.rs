//! # Schema Node Model
//!
//! Typed view of one property definition inside a schema's `properties` map.
//!
//! A definition is either a `$ref` pointing elsewhere or a concrete node
//! carrying `type`, `description`, `maximumSize`, an optional `pattern`, and
//! an optional controlled-value list declared under `anyOf` or `enum`.
//!
//! ## Precedence
//!
//! - `$ref` wins over every sibling keyword: the whole definition is
//!   replaced by its target when dereferenced.
//! - `pattern` wins over a value list when deciding which values a property
//!   advertises ([`PropertyNode::value_source`]).
//! - `anyOf` and `enum` together on one property is rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Schema keywords recognised as declaring a controlled-value list.
pub const VALUE_LIST_KEYWORDS: [&str; 2] = ["anyOf", "enum"];

/// One of the two keywords that declare a controlled vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueListKeyword {
    /// Union of constants: `"anyOf": [{"const": ...}, ...]`.
    #[serde(rename = "anyOf")]
    AnyOf,
    /// Enumeration: `"enum": [...]`.
    #[serde(rename = "enum")]
    Enum,
}

impl ValueListKeyword {
    /// All recognised keywords, in the order they are probed.
    pub const ALL: [ValueListKeyword; 2] = [ValueListKeyword::AnyOf, ValueListKeyword::Enum];

    /// The keyword as it appears in a schema document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnyOf => "anyOf",
            Self::Enum => "enum",
        }
    }
}

impl std::fmt::Display for ValueListKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of a controlled-value list.
///
/// Fields absent from the entry stay `None`; nothing is defaulted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueEntry {
    /// The `const` value, or the scalar itself for a plain `enum` member.
    pub constant: Option<Value>,
    /// Human-readable description of the value.
    pub description: Option<String>,
    /// Provenance of the value (ontology, standard, ...).
    pub source: Option<String>,
    /// The entry's own `type`, when it admits a whole type instead of a constant.
    pub declared_type: Option<String>,
}

impl ValueEntry {
    fn parse(property: &str, keyword: ValueListKeyword, raw: &Value) -> Result<Self, SchemaError> {
        match (keyword, raw) {
            (_, Value::Object(obj)) => Ok(Self {
                constant: obj.get("const").cloned(),
                description: text_field(obj, "description"),
                source: text_field(obj, "source"),
                declared_type: obj.get("type").and_then(type_label),
            }),
            (ValueListKeyword::Enum, scalar) => Ok(Self {
                constant: Some(scalar.clone()),
                ..Self::default()
            }),
            (ValueListKeyword::AnyOf, other) => Err(SchemaError::load(
                format!("#/properties/{property}/anyOf"),
                format!("expected an object entry, found {other}"),
            )),
        }
    }

    /// Whether this entry's constant is itself a string.
    pub fn has_string_constant(&self) -> bool {
        self.constant.as_ref().is_some_and(Value::is_string)
    }

    /// Whether this entry declares one of the given `type` names.
    pub fn declares_type_in(&self, types: &[&str]) -> bool {
        self.declared_type
            .as_deref()
            .is_some_and(|t| types.contains(&t))
    }
}

/// A controlled-value list and the keyword it was declared under.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueList {
    /// The keyword the list was declared under.
    pub keyword: ValueListKeyword,
    /// The entries, in document order.
    pub entries: Vec<ValueEntry>,
}

/// Which values a property advertises, after applying keyword precedence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueSource<'a> {
    /// The property is constrained by a regular expression.
    Pattern(&'a str),
    /// The property is constrained by a controlled-value list.
    List(&'a ValueList),
    /// The property advertises no values.
    Unconstrained,
}

/// A concrete (non-reference) property definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyNode {
    /// The declared `type`, with multi-type arrays joined by commas.
    pub type_name: Option<String>,
    /// The `description` keyword.
    pub description: Option<String>,
    /// The custom `maximumSize` keyword.
    pub maximum_size: Option<i64>,
    /// The `pattern` keyword.
    pub pattern: Option<String>,
    /// The controlled-value list, if one of the value-list keywords is present.
    pub value_list: Option<ValueList>,
}

impl PropertyNode {
    /// Parse a concrete property definition.
    ///
    /// Boolean schemas (`true`/`false`) parse to an empty node.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AmbiguousValueList`] when both `anyOf` and
    /// `enum` are present, and [`SchemaError::SchemaLoad`] when a keyword
    /// has the wrong shape.
    pub fn parse(property: &str, definition: &Value) -> Result<Self, SchemaError> {
        let obj = match definition {
            Value::Object(obj) => obj,
            Value::Bool(_) => return Ok(Self::default()),
            other => {
                return Err(SchemaError::load(
                    format!("#/properties/{property}"),
                    format!("expected an object definition, found {other}"),
                ))
            }
        };

        let maximum_size = match obj.get("maximumSize") {
            None => None,
            Some(raw) => Some(integral(raw).ok_or_else(|| {
                SchemaError::load(
                    format!("#/properties/{property}/maximumSize"),
                    format!("expected an integer, found {raw}"),
                )
            })?),
        };

        let pattern = match obj.get("pattern") {
            None => None,
            Some(Value::String(p)) => Some(p.clone()),
            Some(other) => {
                return Err(SchemaError::load(
                    format!("#/properties/{property}/pattern"),
                    format!("expected a string, found {other}"),
                ))
            }
        };

        Ok(Self {
            type_name: obj.get("type").and_then(type_label),
            description: text_field(obj, "description"),
            maximum_size,
            pattern,
            value_list: parse_value_list(property, obj)?,
        })
    }

    /// The values this property advertises. `pattern` outranks a value list.
    pub fn value_source(&self) -> ValueSource<'_> {
        if let Some(pattern) = &self.pattern {
            ValueSource::Pattern(pattern)
        } else if let Some(list) = &self.value_list {
            ValueSource::List(list)
        } else {
            ValueSource::Unconstrained
        }
    }
}

/// A property definition as written in the schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `{"$ref": "..."}`: the definition lives elsewhere.
    Reference(String),
    /// A concrete definition.
    Property(PropertyNode),
}

impl SchemaNode {
    /// Parse a property definition, recognising `$ref` first.
    pub fn parse(property: &str, definition: &Value) -> Result<Self, SchemaError> {
        match definition.get("$ref") {
            Some(Value::String(reference)) => Ok(Self::Reference(reference.clone())),
            Some(other) => Err(SchemaError::load(
                format!("#/properties/{property}/$ref"),
                format!("expected a string, found {other}"),
            )),
            None => PropertyNode::parse(property, definition).map(Self::Property),
        }
    }
}

/// Render a `type` keyword as a label. Arrays of type names join with commas.
pub fn type_label(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let names: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!names.is_empty()).then(|| names.join(","))
        }
        _ => None,
    }
}

fn parse_value_list(
    property: &str,
    obj: &Map<String, Value>,
) -> Result<Option<ValueList>, SchemaError> {
    let present: Vec<ValueListKeyword> = ValueListKeyword::ALL
        .into_iter()
        .filter(|k| obj.contains_key(k.as_str()))
        .collect();

    let keyword = match present.as_slice() {
        [] => return Ok(None),
        [one] => *one,
        many => {
            let keywords: Vec<&str> = many.iter().map(|k| k.as_str()).collect();
            return Err(SchemaError::AmbiguousValueList {
                property: property.to_string(),
                keywords: keywords.join(", "),
            });
        }
    };

    let raw_entries = obj
        .get(keyword.as_str())
        .and_then(Value::as_array)
        .ok_or_else(|| {
            SchemaError::load(
                format!("#/properties/{property}/{keyword}"),
                "expected an array",
            )
        })?;

    let entries = raw_entries
        .iter()
        .map(|raw| ValueEntry::parse(property, keyword, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(ValueList { keyword, entries }))
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn integral(raw: &Value) -> Option<i64> {
    raw.as_i64().or_else(|| {
        raw.as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}
