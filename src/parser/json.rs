//! JSON array parser

use std::borrow::Cow;
use std::path::Path;

use indexmap::IndexSet;
use serde_json::Value;

use crate::config::Config;
use crate::error::{MergeError, Result};
use crate::model::{CellValue, Table};

use super::Parser;

/// Parser for JSON array files
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MergeError::parse(path, format!("cannot read file: {}", e)))?;
        JsonParser::parse_str(&contents).map_err(|e| match e {
            MergeError::Parse { message, .. } => MergeError::parse(path, message),
            MergeError::Json(e) => MergeError::parse(path, e.to_string()),
            other => other,
        })
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "json")
    }
}

impl JsonParser {
    /// Parse an array of objects (or a single object) into a table
    pub fn parse_str(contents: &str) -> Result<Table> {
        let value: Value = serde_json::from_str(contents)?;

        // Handle both arrays and single objects
        let array = match value {
            Value::Array(arr) => arr,
            Value::Object(_) => vec![value],
            _ => return Err(MergeError::parse("<input>", "JSON must be an array or object")),
        };

        // Collect all unique keys across all objects to build column list
        let mut column_names: IndexSet<String> = IndexSet::new();
        for item in &array {
            match item {
                Value::Object(obj) => column_names.extend(obj.keys().cloned()),
                _ => {
                    return Err(MergeError::parse(
                        "<input>",
                        "JSON array elements must be objects",
                    ))
                }
            }
        }

        if column_names.is_empty() {
            return Err(MergeError::parse("<input>", "JSON input has no columns"));
        }

        let mut table = Table::with_column_names(column_names.iter().cloned());

        for (line_num, item) in array.iter().enumerate() {
            if let Value::Object(obj) = item {
                let cells = column_names
                    .iter()
                    .map(|key| json_value_to_cell(obj.get(key)))
                    .collect();
                table.add_row(cells, 0, line_num + 1);
            }
        }

        table.infer_column_types();
        Ok(table)
    }
}

fn json_value_to_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            // Integers above i64::MAX keep their digits as text
            match (n.as_i64(), n.is_f64()) {
                (Some(i), _) => CellValue::Int(i),
                (None, true) => CellValue::Float(n.as_f64().unwrap_or(f64::NAN)),
                (None, false) => CellValue::String(Cow::Owned(n.to_string())),
            }
        }
        Some(Value::String(s)) => {
            if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return CellValue::Date(date);
            }
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                return CellValue::DateTime(dt);
            }
            CellValue::String(Cow::Owned(s.clone()))
        }
        // Nested structures are kept as their JSON text
        Some(nested) => CellValue::String(Cow::Owned(nested.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_union_of_keys() {
        let table =
            JsonParser::parse_str(r#"[{"id": 1, "name": "a"}, {"id": 2, "email": "b@x"}]"#)
                .unwrap();

        let names: Vec<_> = table.column_names().collect();
        assert_eq!(names, vec!["id", "name", "email"]);
        assert_eq!(table.value(1, "name"), Some(&CellValue::Null));
        assert_eq!(table.value(1, "email"), Some(&CellValue::from("b@x")));
    }

    #[test]
    fn test_single_object_and_nested_values() {
        let table = JsonParser::parse_str(r#"{"id": 1.5, "tags": ["a", "b"]}"#).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.value(0, "id"), Some(&CellValue::Float(1.5)));
        assert_eq!(table.value(0, "tags"), Some(&CellValue::from(r#"["a","b"]"#)));
    }

    #[test]
    fn test_wide_integers_stay_text() {
        let table = JsonParser::parse_str(r#"[{"id": 18446744073709551615}]"#).unwrap();
        assert_eq!(table.value(0, "id"), Some(&CellValue::from("18446744073709551615")));
    }

    #[test]
    fn test_rejects_scalars() {
        assert!(JsonParser::parse_str("42").is_err());
        assert!(JsonParser::parse_str("[1, 2]").is_err());
        assert!(JsonParser::parse_str("[]").is_err());
        assert!(matches!(JsonParser::parse_str("{oops"), Err(MergeError::Json(_))));
    }
}
