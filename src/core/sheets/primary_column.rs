use super::sheet_models::{ColumnInfo, ColumnType};

/// Name fragments that mark a column as the card title, highest priority first.
pub const PRIMARY_NAME_FRAGMENTS: [&str; 8] = [
    "nom",
    "name",
    "titre",
    "title",
    "nom complet",
    "full name",
    "client",
    "customer",
];

/// Picks the column used as each card's title.
///
/// Fragments are tried in order and, for each fragment, columns in header
/// order. Without a name match the first `text` column is used, then the
/// first column of any type.
pub fn select_primary(columns: &[ColumnInfo]) -> Option<&ColumnInfo> {
    let lowered: Vec<String> = columns.iter().map(|c| c.name.to_lowercase()).collect();

    for fragment in PRIMARY_NAME_FRAGMENTS {
        if let Some(position) = lowered.iter().position(|name| name.contains(fragment)) {
            return columns.get(position);
        }
    }

    columns
        .iter()
        .find(|c| c.column_type == ColumnType::Text)
        .or_else(|| columns.first())
}
