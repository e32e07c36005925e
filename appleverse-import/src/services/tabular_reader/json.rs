//! JSON datasets: a single object or an array of objects

use crate::models::RawRow;
use serde_json::Value;

/// Parse JSON text into rows
///
/// A lone object is one row. Array elements that are not objects are skipped.
pub fn parse_json(text: &str, origin: &str) -> Result<Vec<RawRow>, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;

    let objects = match value {
        Value::Object(map) => vec![map],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                other => {
                    tracing::debug!(origin, "Ignoring non-object array element: {}", other);
                    None
                }
            })
            .collect(),
        other => {
            return Err(format!(
                "expected an object or an array of objects, found {}",
                json_kind(&other)
            ))
        }
    };

    Ok(objects
        .into_iter()
        .enumerate()
        .map(|(i, map)| {
            RawRow::from_pairs(
                origin,
                i + 1,
                map.into_iter().map(|(k, v)| (k, scalar_to_string(v))),
            )
        })
        .collect())
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_object_is_one_row() {
        let rows = parse_json(r#"{"ACNO": "MAL0100", "CULTIVAR NAME": "Honeycrisp"}"#, "one.json").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("ACNO"), Some("MAL0100"));
    }

    #[test]
    fn test_array_of_objects() {
        let rows = parse_json(
            r#"[{"NAME": "Gala", "YEAR": 1934, "ACTIVE": true, "NOTE": null}, 5, {"NAME": "Fuji"}]"#,
            "many.json",
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("YEAR"), Some("1934"));
        assert_eq!(rows[0].get("ACTIVE"), Some("true"));
        assert_eq!(rows[0].get("NOTE"), Some(""));
        assert_eq!(rows[1].get("NAME"), Some("Fuji"));
        assert_eq!(rows[1].row_number, 2);
    }

    #[test]
    fn test_scalar_document_rejected() {
        assert!(parse_json("42", "bad.json").is_err());
        assert!(parse_json("{not json", "bad.json").is_err());
    }
}
