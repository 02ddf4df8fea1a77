//! # Type Coercion
//!
//! Reconciles flat record values with a schema whose controlled-value lists
//! mix string constants and typed entries.
//!
//! - **Narrowing** turns a non-string value into its string form when the
//!   property's value list contains a string constant.
//! - **Widening** turns a string back into a boolean or number when the
//!   property's value list declares an entry `type` from a target set.
//!
//! Both passes only touch properties that exist in the schema and declare a
//! value list. Every other key passes through unchanged.
//!
//! JSON records use [`narrow_json_record`], which leaves a value alone when
//! a typed entry of the list already admits it, and are never widened.
//!
//! Tabular cells additionally go through [`type_tabular_record`] first,
//! which parses cells of properties declared purely numeric or boolean.

use serde_json::{Number, Value};

use dccv_core::{DataRecord, PropertyNode};

use crate::deref::DereferencedSchema;

/// A widening target: the entry `type`s that trigger it and the conversion.
#[derive(Debug, Clone, Copy)]
pub struct WidenTarget {
    /// Entry `type` names that select this target.
    pub types: &'static [&'static str],
    /// String-to-typed conversion. Returns the input unchanged on no match.
    pub convert: fn(&str) -> Value,
}

impl WidenTarget {
    /// Integers and decimal numbers.
    pub const NUMERIC: WidenTarget = WidenTarget {
        types: &["integer", "number"],
        convert: string_to_numeric,
    };

    /// Case-insensitive `true` / `false`.
    pub const BOOLEAN: WidenTarget = WidenTarget {
        types: &["boolean"],
        convert: string_to_bool,
    };

    /// Targets in the order the validation pipeline applies them.
    pub const PIPELINE: [WidenTarget; 2] = [WidenTarget::NUMERIC, WidenTarget::BOOLEAN];
}

/// Narrow one value against its property definition.
pub fn narrow_value(node: &PropertyNode, value: &Value) -> Value {
    if value.is_string() {
        return value.clone();
    }
    let Some(list) = &node.value_list else {
        return value.clone();
    };
    if list.entries.iter().any(|entry| entry.has_string_constant()) {
        match value {
            Value::Bool(b) => return Value::String(b.to_string()),
            Value::Number(n) => return Value::String(n.to_string()),
            _ => {}
        }
    }
    value.clone()
}

/// Widen one value against its property definition.
pub fn widen_value(node: &PropertyNode, value: &Value, target: WidenTarget) -> Value {
    let Value::String(text) = value else {
        return value.clone();
    };
    let Some(list) = &node.value_list else {
        return value.clone();
    };
    if list.entries.iter().any(|entry| entry.declares_type_in(target.types)) {
        (target.convert)(text)
    } else {
        value.clone()
    }
}

/// Narrow every value of a record. Unknown keys pass through.
pub fn narrow_record(record: &DataRecord, schema: &DereferencedSchema) -> DataRecord {
    map_known(record, schema, narrow_value)
}

/// Narrow a JSON record, keeping values a typed list entry already admits.
///
/// A JSON `12` for a list of `"Not collected"` and `{"type": "integer"}`
/// stays `12`; a JSON `"12"` is a string and is left for the validator.
pub fn narrow_json_record(record: &DataRecord, schema: &DereferencedSchema) -> DataRecord {
    map_known(record, schema, |node, value| {
        if admitted_by_typed_entry(node, value) {
            value.clone()
        } else {
            narrow_value(node, value)
        }
    })
}

/// Whether an entry of the property's value list declares the value's type.
pub fn admitted_by_typed_entry(node: &PropertyNode, value: &Value) -> bool {
    let types: &[&str] = match value {
        Value::Bool(_) => &["boolean"],
        Value::Number(n) if is_integral(n) => &["integer", "number"],
        Value::Number(_) => &["number"],
        _ => return false,
    };
    node.value_list
        .as_ref()
        .is_some_and(|list| list.entries.iter().any(|entry| entry.declares_type_in(types)))
}

fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// Widen every value of a record towards `target`. Unknown keys pass through.
pub fn widen_record(record: &DataRecord, schema: &DereferencedSchema, target: WidenTarget) -> DataRecord {
    map_known(record, schema, |node, value| widen_value(node, value, target))
}

fn map_known(
    record: &DataRecord,
    schema: &DereferencedSchema,
    f: impl Fn(&PropertyNode, &Value) -> Value,
) -> DataRecord {
    record
        .iter()
        .map(|(key, value)| {
            let coerced = match schema.property(key) {
                Some(node) => f(node, value),
                None => value.clone(),
            };
            (key.clone(), coerced)
        })
        .collect()
}

/// Convert digit strings to integers and single-point decimals to floats.
///
/// `"42"` becomes `42`, `"4.2"` becomes `4.2`; `"-1"`, `"1e3"` and `"1.2.3"`
/// stay strings. Digit strings past `u64::MAX` become floats.
pub fn string_to_numeric(text: &str) -> Value {
    if is_digits(text) {
        if let Ok(n) = text.parse::<i64>() {
            return Value::from(n);
        }
        if let Ok(n) = text.parse::<u64>() {
            return Value::from(n);
        }
        if let Some(n) = finite_number(text) {
            return Value::Number(n);
        }
    }
    if let Some((whole, fraction)) = text.split_once('.') {
        if !fraction.contains('.') && is_digits(&format!("{whole}{fraction}")) {
            if let Some(n) = finite_number(text) {
                return Value::Number(n);
            }
        }
    }
    Value::String(text.to_string())
}

/// Convert case-insensitive `true`/`false` to booleans.
pub fn string_to_bool(text: &str) -> Value {
    match text.to_ascii_uppercase().as_str() {
        "TRUE" => Value::Bool(true),
        "FALSE" => Value::Bool(false),
        _ => Value::String(text.to_string()),
    }
}

fn finite_number(text: &str) -> Option<Number> {
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Parse the text cells of a tabular record into declared scalar types.
///
/// Only properties whose declared types are all non-string scalars are
/// touched. Cells that do not parse stay text so the validator reports them.
pub fn type_tabular_record(record: &DataRecord, schema: &DereferencedSchema) -> DataRecord {
    map_known(record, schema, |node, value| match value {
        Value::String(text) => type_cell(node, text).unwrap_or_else(|| value.clone()),
        other => other.clone(),
    })
}

fn type_cell(node: &PropertyNode, text: &str) -> Option<Value> {
    let declared = node.type_name.as_deref()?;
    let types: Vec<&str> = declared.split(',').map(str::trim).collect();
    if types.iter().any(|t| !matches!(*t, "integer" | "number" | "boolean" | "null")) {
        return None;
    }
    let trimmed = text.trim();
    if types.iter().any(|t| matches!(*t, "integer" | "number")) {
        if let Some(n) = parse_number(trimmed) {
            return Some(n);
        }
    }
    if types.contains(&"boolean") {
        if let Value::Bool(b) = string_to_bool(trimmed) {
            return Some(Value::Bool(b));
        }
    }
    None
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Ok(n) = text.parse::<u64>() {
        return Some(Value::from(n));
    }
    finite_number(text).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_schema() -> DereferencedSchema {
        DereferencedSchema::from_value(json!({
            "properties": {
                "status": {"anyOf": [
                    {"const": "true"},
                    {"const": "false"},
                    {"const": "Unknown"}
                ]},
                "flag": {"anyOf": [
                    {"const": "Unknown"},
                    {"type": "boolean"}
                ]},
                "count": {"anyOf": [
                    {"const": "Not collected"},
                    {"type": "integer"}
                ]},
                "plain": {"type": "integer"},
                "ratio": {"type": ["number", "null"]},
                "label": {"type": ["string", "integer"]}
            }
        }))
        .unwrap()
    }

    fn record(value: Value) -> DataRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn narrowing_stringifies_when_list_has_string_constant() {
        let schema = status_schema();
        let out = narrow_record(&record(json!({"status": true, "other": 5})), &schema);
        assert_eq!(out["status"], json!("true"));
        assert_eq!(out["other"], json!(5));
    }

    #[test]
    fn narrowing_numbers_uses_decimal_text() {
        let schema = status_schema();
        let out = narrow_record(&record(json!({"status": 3, "count": 1.5})), &schema);
        assert_eq!(out["status"], json!("3"));
        assert_eq!(out["count"], json!("1.5"));
    }

    #[test]
    fn narrowing_skips_properties_without_value_list() {
        let schema = status_schema();
        let out = narrow_record(&record(json!({"plain": 7})), &schema);
        assert_eq!(out["plain"], json!(7));
    }

    #[test]
    fn narrowing_leaves_value_when_no_string_constant() {
        let schema = DereferencedSchema::from_value(json!({
            "properties": {"n": {"enum": [1, 2, 3]}}
        }))
        .unwrap();
        let out = narrow_record(&record(json!({"n": 2})), &schema);
        assert_eq!(out["n"], json!(2));
    }

    #[test]
    fn widening_numeric_only_for_typed_entries() {
        let schema = status_schema();
        let out = widen_record(
            &record(json!({"count": "12", "status": "12"})),
            &schema,
            WidenTarget::NUMERIC,
        );
        assert_eq!(out["count"], json!(12));
        assert_eq!(out["status"], json!("12"));
    }

    #[test]
    fn widening_keeps_non_matching_strings() {
        let schema = status_schema();
        let out = widen_record(
            &record(json!({"count": "Not collected"})),
            &schema,
            WidenTarget::NUMERIC,
        );
        assert_eq!(out["count"], json!("Not collected"));
    }

    #[test]
    fn widening_boolean_is_case_insensitive() {
        let schema = status_schema();
        let out = widen_record(&record(json!({"flag": "TRUE"})), &schema, WidenTarget::BOOLEAN);
        assert_eq!(out["flag"], json!(true));
    }

    #[test]
    fn numeric_sniffing() {
        assert_eq!(string_to_numeric("42"), json!(42));
        assert_eq!(string_to_numeric("4.25"), json!(4.25));
        assert_eq!(string_to_numeric("-1"), json!("-1"));
        assert_eq!(string_to_numeric("1.2.3"), json!("1.2.3"));
        assert_eq!(string_to_numeric("1e3"), json!("1e3"));
        assert_eq!(string_to_numeric(""), json!(""));
        assert_eq!(string_to_numeric("."), json!("."));
    }

    #[test]
    fn digit_strings_past_i64_stay_numeric() {
        assert_eq!(
            string_to_numeric("10000000000000000000"),
            json!(10_000_000_000_000_000_000u64)
        );
        let huge = "1".repeat(30);
        assert!(string_to_numeric(&huge).is_f64(), "{huge}");
    }

    #[test]
    fn json_narrowing_keeps_values_a_typed_entry_admits() {
        let schema = status_schema();
        let out = narrow_json_record(
            &record(json!({
                "count": 10_000_000_000_000_000_000u64,
                "flag": false,
                "status": true
            })),
            &schema,
        );
        assert_eq!(out["count"], json!(10_000_000_000_000_000_000u64));
        assert_eq!(out["flag"], json!(false));
        assert_eq!(out["status"], json!("true"));

        let out = narrow_json_record(&record(json!({"count": 1.5, "flag": 2})), &schema);
        assert_eq!(out["count"], json!("1.5"));
        assert_eq!(out["flag"], json!("2"));
    }

    #[test]
    fn boolean_sniffing() {
        assert_eq!(string_to_bool("false"), json!(false));
        assert_eq!(string_to_bool("True"), json!(true));
        assert_eq!(string_to_bool("yes"), json!("yes"));
    }

    #[test]
    fn boolean_round_trip_through_mixed_list() {
        let schema = DereferencedSchema::from_value(json!({
            "properties": {"flag": {"anyOf": [{"const": "Unknown"}, {"const": true, "type": "boolean"}]}}
        }))
        .unwrap();
        let node = schema.property("flag").unwrap();
        let narrowed = narrow_value(node, &json!(true));
        assert_eq!(narrowed, json!("true"));
        assert_eq!(widen_value(node, &narrowed, WidenTarget::BOOLEAN), json!(true));
    }

    #[test]
    fn tabular_cells_parse_declared_scalars() {
        let schema = status_schema();
        let out = type_tabular_record(
            &record(json!({
                "plain": "7",
                "ratio": "-0.5",
                "label": "001",
                "status": "true",
                "unknown": "3"
            })),
            &schema,
        );
        assert_eq!(out["plain"], json!(7));
        assert_eq!(out["ratio"], json!(-0.5));
        assert_eq!(out["label"], json!("001"));
        assert_eq!(out["status"], json!("true"));
        assert_eq!(out["unknown"], json!("3"));
    }

    #[test]
    fn tabular_cells_that_do_not_parse_stay_text() {
        let schema = status_schema();
        let out = type_tabular_record(&record(json!({"plain": "seven"})), &schema);
        assert_eq!(out["plain"], json!("seven"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn narrowing_a_string_is_noop(text in ".*") {
                let schema = status_schema();
                let node = schema.property("status").unwrap();
                let value = Value::String(text);
                prop_assert_eq!(narrow_value(node, &value), value);
            }

            #[test]
            fn widening_a_non_string_is_noop(n in any::<i64>(), b in any::<bool>()) {
                let schema = status_schema();
                for key in ["flag", "count"] {
                    let node = schema.property(key).unwrap();
                    for target in WidenTarget::PIPELINE {
                        prop_assert_eq!(widen_value(node, &json!(n), target), json!(n));
                        prop_assert_eq!(widen_value(node, &json!(b), target), json!(b));
                    }
                }
            }

            #[test]
            fn digit_strings_widen_to_integers(n in 0u32..1_000_000) {
                prop_assert_eq!(string_to_numeric(&n.to_string()), json!(n));
            }
        }
    }
}
