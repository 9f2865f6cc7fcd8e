// Card building: one contact-style card per parsed row.

use serde::Serialize;

use super::phone::{tel_link, whatsapp_link, PhoneProfile};
use super::sheet_models::{ColumnInfo, ColumnType, ParsedRow};

/// Title shown when the title column is empty for a row.
pub const UNTITLED: &str = "Untitled";

/// A one-tap action derived from a typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CardAction {
    Email { column: String, href: String },
    Call { column: String, href: String },
    WhatsApp { column: String, href: String },
}

impl CardAction {
    pub fn href(&self) -> &str {
        match self {
            CardAction::Email { href, .. }
            | CardAction::Call { href, .. }
            | CardAction::WhatsApp { href, .. } => href,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardAction::Email { .. } => "Email",
            CardAction::Call { .. } => "Call",
            CardAction::WhatsApp { .. } => "WhatsApp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactCard {
    pub title: String,
    /// Non-empty values of the columns that are neither contact columns nor
    /// the title, in column order.
    pub details: Vec<(String, String)>,
    pub emails: Vec<String>,
    pub actions: Vec<CardAction>,
}

/// Builds a card for `row`. Without a primary column the first column's value
/// becomes the title.
pub fn build_card(
    row: &ParsedRow,
    columns: &[ColumnInfo],
    primary: Option<&ColumnInfo>,
    profile: &PhoneProfile,
) -> ContactCard {
    let title_column = primary.or_else(|| columns.first());
    let title = title_column
        .map(|c| row.get(&c.name))
        .filter(|v| !v.is_empty())
        .unwrap_or(UNTITLED)
        .to_string();

    let details = columns
        .iter()
        .filter(|c| !matches!(c.column_type, ColumnType::Email | ColumnType::Phone))
        .filter(|c| primary.map_or(true, |p| p.index != c.index))
        .filter_map(|c| {
            let value = row.get(&c.name);
            (!value.is_empty()).then(|| (c.name.clone(), value.to_string()))
        })
        .collect();

    let mut emails = Vec::new();
    let mut actions = Vec::new();

    for column in columns.iter().filter(|c| c.column_type == ColumnType::Email) {
        let email = row.get(&column.name);
        if email.is_empty() {
            continue;
        }
        emails.push(email.to_string());
        actions.push(CardAction::Email {
            column: column.name.clone(),
            href: format!("mailto:{}", email.trim()),
        });
    }

    for column in columns.iter().filter(|c| c.column_type == ColumnType::Phone) {
        let phone = row.get(&column.name);
        if phone.is_empty() {
            continue;
        }
        if let Some(href) = tel_link(phone) {
            actions.push(CardAction::Call {
                column: column.name.clone(),
                href,
            });
        }
        if let Some(href) = whatsapp_link(phone, profile) {
            actions.push(CardAction::WhatsApp {
                column: column.name.clone(),
                href,
            });
        }
    }

    ContactCard {
        title,
        details,
        emails,
        actions,
    }
}
