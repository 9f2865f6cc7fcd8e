use super::sheet_models::{ParsedRow, SheetSummary};

/// Rows with any value containing `term`, case-insensitive. An empty term keeps
/// every row.
pub fn filter_rows<'a>(rows: &'a [ParsedRow], term: &str) -> Vec<&'a ParsedRow> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return rows.iter().collect();
    }

    rows.iter()
        .filter(|row| row.values().any(|v| v.to_lowercase().contains(&needle)))
        .collect()
}

/// Spreadsheets whose name contains `term`, case-insensitive.
pub fn filter_sheets<'a>(sheets: &'a [SheetSummary], term: &str) -> Vec<&'a SheetSummary> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return sheets.iter().collect();
    }

    sheets
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .collect()
}
