//! # Schema Rendering
//!
//! Writes a schema value back out as indented JSON text, keeping key order.
//!
//! Booleans are written as quoted strings: in a generated schema they only
//! ever appear as enumerated constants taken from spreadsheet cells, where
//! `true` is a label rather than a JSON boolean. Numbers are written bare.

use serde_json::{Map, Value};

const INDENT: &str = "  ";

/// Render `schema` as JSON text terminated by a newline.
pub fn render_schema(schema: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, schema, 0);
    out.push('\n');
    out
}

/// `","` for every element except the last.
fn separator(index: usize, len: usize) -> &'static str {
    if index + 1 < len {
        ","
    } else {
        ""
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Object(map) => write_object(out, map, depth),
        Value::Array(items) => write_array(out, items, depth),
        Value::String(s) => out.push_str(&quoted(s)),
        Value::Bool(b) => out.push_str(&quoted(&b.to_string())),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Null => out.push_str("null"),
    }
}

fn write_object(out: &mut String, map: &Map<String, Value>, depth: usize) {
    if map.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for (index, (key, value)) in map.iter().enumerate() {
        indent(out, depth + 1);
        out.push_str(&quoted(key));
        out.push_str(": ");
        write_value(out, value, depth + 1);
        out.push_str(separator(index, map.len()));
        out.push('\n');
    }
    indent(out, depth);
    out.push('}');
}

fn write_array(out: &mut String, items: &[Value], depth: usize) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push_str("[\n");
    for (index, item) in items.iter().enumerate() {
        indent(out, depth + 1);
        write_value(out, item, depth + 1);
        out.push_str(separator(index, items.len()));
        out.push('\n');
    }
    indent(out, depth);
    out.push(']');
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn quoted(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_nested_structure_with_commas() {
        let schema = json!({
            "type": "object",
            "properties": {
                "age": {"type": "integer", "maximumSize": 3},
                "status": {"anyOf": [{"const": "Unknown"}, {"const": true}]}
            },
            "required": ["age"]
        });
        let text = render_schema(&schema);
        let expected = r#"{
  "type": "object",
  "properties": {
    "age": {
      "type": "integer",
      "maximumSize": 3
    },
    "status": {
      "anyOf": [
        {
          "const": "Unknown"
        },
        {
          "const": "true"
        }
      ]
    }
  },
  "required": [
    "age"
  ]
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn output_is_valid_json_preserving_order() {
        let schema = json!({"z": 1, "a": [1.5, "x", null], "m": {}, "e": []});
        let parsed: Value = serde_json::from_str(&render_schema(&schema)).unwrap();
        let keys: Vec<&str> = parsed.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m", "e"]);
        assert_eq!(parsed["a"], json!([1.5, "x", null]));
        assert_eq!(parsed["m"], json!({}));
        assert_eq!(parsed["e"], json!([]));
    }

    #[test]
    fn strings_are_escaped() {
        let text = render_schema(&json!({"pattern": "^\"a\"\\d+$"}));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["pattern"], "^\"a\"\\d+$");
    }

    #[test]
    fn separator_skips_last_element() {
        assert_eq!(separator(0, 2), ",");
        assert_eq!(separator(1, 2), "");
    }
}
