//! Tagged result shapes returned by the data backend.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

/// One column of a tabular result, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    /// Backend SQL type name, e.g. `DECIMAL`, `BIGINT`, `STRING`.
    #[serde(default)]
    pub type_name: String,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Rows from an executed statement plus the query that produced them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<ColumnSchema>,
    /// Cell values as delivered by the backend (usually strings or null).
    pub rows: Vec<Vec<Value>>,
    pub description: Option<String>,
    pub source_query: Option<String>,
}

/// Result of one backend question. Exactly one shape is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum QueryResult {
    Tabular(TabularResult),
    AttachmentText { content: String },
    PlainMessage { content: String },
    Error { message: String },
}

impl QueryResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Parse the loosely-typed answer layout
    /// (`columns`/`data`/`query_description`/`query_query`, `message` or `error`).
    pub fn from_value(value: &Value) -> Result<Self, BridgeError> {
        let obj = value
            .as_object()
            .ok_or_else(|| BridgeError::UnrecognizedResultShape(json_kind(value).into()))?;

        if let (Some(columns), Some(data)) = (obj.get("columns"), obj.get("data")) {
            return parse_tabular(columns, data, obj);
        }
        if let Some(message) = obj.get("message").and_then(Value::as_str) {
            return Ok(Self::PlainMessage {
                content: message.to_string(),
            });
        }
        if let Some(error) = obj.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Ok(Self::Error { message });
        }

        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        Err(BridgeError::UnrecognizedResultShape(format!(
            "object with keys [{}]",
            keys.join(", ")
        )))
    }
}

fn parse_tabular(
    columns: &Value,
    data: &Value,
    obj: &serde_json::Map<String, Value>,
) -> Result<QueryResult, BridgeError> {
    let columns: Vec<ColumnSchema> = columns
        .get("columns")
        .cloned()
        .map(serde_json::from_value)
        .transpose()?
        .ok_or_else(|| BridgeError::UnrecognizedResultShape(format!("column format {columns}")))?;

    let rows: Vec<Vec<Value>> = match data.get("data_array") {
        Some(Value::Null) | None => Vec::new(),
        Some(rows) => serde_json::from_value(rows.clone())?,
    };

    let text_field = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(QueryResult::Tabular(TabularResult {
        columns,
        rows,
        description: text_field("query_description"),
        source_query: text_field("query_query"),
    }))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Canonical answer handed to any presentation layer.
///
/// `image_path`, when set, points at a file that was written before the
/// answer was returned.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedAnswer {
    pub markdown_text: String,
    pub image_path: Option<PathBuf>,
}

impl NormalizedAnswer {
    pub fn text(markdown_text: impl Into<String>) -> Self {
        Self {
            markdown_text: markdown_text.into(),
            image_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tabular_layout() {
        let value = json!({
            "columns": {"columns": [
                {"name": "driver", "type_name": "STRING", "position": 0},
                {"name": "points", "type_name": "DECIMAL"}
            ]},
            "data": {"data_array": [["Hamilton", "4639.5"], ["Verstappen", null]]},
            "query_description": "Career points per driver",
            "query_query": ""
        });

        let QueryResult::Tabular(table) = QueryResult::from_value(&value).unwrap() else {
            panic!("expected tabular result");
        };
        assert_eq!(table.columns[1], ColumnSchema::new("points", "DECIMAL"));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][1], Value::Null);
        assert_eq!(table.description.as_deref(), Some("Career points per driver"));
        assert_eq!(table.source_query, None);
    }

    #[test]
    fn parses_message_and_error_layouts() {
        assert_eq!(
            QueryResult::from_value(&json!({"message": "hello"})).unwrap(),
            QueryResult::PlainMessage {
                content: "hello".into()
            }
        );
        assert!(QueryResult::from_value(&json!({"error": "boom"}))
            .unwrap()
            .is_error());
    }

    #[test]
    fn rejects_unknown_layouts() {
        for value in [json!(["a"]), json!({"rows": []}), json!({"columns": [1], "data": {}})] {
            assert!(matches!(
                QueryResult::from_value(&value),
                Err(BridgeError::UnrecognizedResultShape(_))
            ));
        }
    }

    #[test]
    fn serializes_with_shape_tag() {
        let value = serde_json::to_value(QueryResult::AttachmentText {
            content: "hi".into(),
        })
        .unwrap();
        assert_eq!(value, json!({"shape": "attachment_text", "content": "hi"}));
    }
}
