// Domain models for a loaded sheet.
// Nothing here knows about HTTP or the terminal; the infra layer fills these
// in from Google's JSON and the CLI layer renders them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Raw 2D grid as returned under the `values` key of the Sheets API.
pub type Grid = Vec<Vec<Value>>;

/// Semantic type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Email,
    Phone,
    Date,
    Url,
    Number,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Email => "email",
            ColumnType::Phone => "phone",
            ColumnType::Date => "date",
            ColumnType::Url => "url",
            ColumnType::Number => "number",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of the sheet, derived from the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Zero-based position in the header row.
    pub index: usize,
}

/// A data row keyed by column name.
///
/// Every row produced by the parser carries exactly the column-name key set,
/// with `""` for cells the raw row did not have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedRow {
    values: HashMap<String, String>,
}

impl ParsedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    /// Value for a column, `""` when the column is unknown.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.values().map(String::as_str)
    }
}

/// Output of the schema parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedSheet {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<ParsedRow>,
}

/// One spreadsheet from the Drive listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub id: String,
    pub name: String,
    pub created_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
}

/// The bits of spreadsheet metadata we read: the document title and the
/// first tab's title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpreadsheetInfo {
    pub title: Option<String>,
    pub first_tab_title: Option<String>,
}

/// Text of a raw cell. `null` reads as empty, numbers and booleans as their
/// JSON text.
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Absent, `null` and `""` cells are falsy. Everything else counts as content,
/// including whitespace-only strings.
pub fn is_falsy(cell: Option<&Value>) -> bool {
    match cell {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("Alice")), "Alice");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&Value::Null), "");
    }

    #[test]
    fn test_falsy_cells() {
        assert!(is_falsy(None));
        assert!(is_falsy(Some(&Value::Null)));
        assert!(is_falsy(Some(&json!(""))));
        assert!(!is_falsy(Some(&json!(" "))));
        assert!(!is_falsy(Some(&json!(0))));
    }

    #[test]
    fn test_parsed_row_defaults_to_empty() {
        let mut row = ParsedRow::new();
        row.insert("Name", "Alice");
        assert_eq!(row.get("Name"), "Alice");
        assert_eq!(row.get("Missing"), "");
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["Name"]);
    }

    #[test]
    fn test_column_type_serializes_lowercase() {
        let column = ColumnInfo {
            name: "Phone".to_string(),
            column_type: ColumnType::Phone,
            index: 1,
        };
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json, json!({ "name": "Phone", "type": "phone", "index": 1 }));
    }
}
