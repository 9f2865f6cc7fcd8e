// Turns the raw grid of a sheet into typed columns and name-keyed rows.
//
// Row 0 is the header. Rows whose cells are all falsy are dropped, every other
// row is kept even when shorter than the header. Rows are built by walking the
// columns (not the raw cells) so each ParsedRow carries exactly the column-name
// key set. Duplicate header names are not disambiguated: the later column
// overwrites the earlier one in each row.

use serde_json::Value;

use super::classifier::classify;
use super::sheet_models::{cell_text, is_falsy, ColumnInfo, ParsedRow, ParsedSheet};

/// Name used for a column whose header cell is empty or missing.
pub fn synthesized_column_name(index: usize) -> String {
    format!("Column {}", index + 1)
}

fn cell_at(row: &[Value], index: usize) -> String {
    row.get(index).map(cell_text).unwrap_or_default()
}

/// Parses a grid into column metadata and rows.
pub fn parse(grid: &[Vec<Value>]) -> ParsedSheet {
    let Some((header, data_rows)) = grid.split_first() else {
        return ParsedSheet::default();
    };

    let columns: Vec<ColumnInfo> = header
        .iter()
        .enumerate()
        .map(|(index, header_cell)| {
            let column_values: Vec<String> =
                data_rows.iter().map(|row| cell_at(row, index)).collect();

            let name = if is_falsy(Some(header_cell)) {
                synthesized_column_name(index)
            } else {
                cell_text(header_cell)
            };

            ColumnInfo {
                name,
                column_type: classify(&column_values),
                index,
            }
        })
        .collect();

    let rows: Vec<ParsedRow> = data_rows
        .iter()
        .filter(|row| row.iter().any(|cell| !is_falsy(Some(cell))))
        .map(|row| {
            let mut parsed = ParsedRow::new();
            for column in &columns {
                parsed.insert(column.name.clone(), cell_at(row, column.index));
            }
            parsed
        })
        .collect();

    tracing::debug!(
        columns = columns.len(),
        rows = rows.len(),
        skipped = data_rows.len() - rows.len(),
        "Parsed sheet grid"
    );

    ParsedSheet { columns, rows }
}
