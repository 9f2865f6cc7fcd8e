// Plain-text rendering for the terminal.
// Everything returns a String so the formatting can be tested without stdout.

use chrono::{DateTime, TimeZone, Utc};

use crate::core::auth::{AuthStatus, TokenState};
use crate::core::sheets::{CardListState, ContactCard, SheetSummary, SheetView};

fn plural(count: usize) -> &'static str {
    if count > 1 {
        "s"
    } else {
        ""
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%d %b %Y %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn render_sheet_list(sheets: &[&SheetSummary], term: Option<&str>) -> String {
    if sheets.is_empty() {
        return match term {
            Some(t) if !t.is_empty() => format!("No spreadsheet matches \"{}\".\n", t),
            _ => "No spreadsheets found.\n".to_string(),
        };
    }

    let mut out = String::new();
    for sheet in sheets {
        out.push_str(&format!(
            "📊 {}\n   modified {}  ·  id {}\n",
            sheet.name,
            format_time(sheet.modified_time),
            sheet.id
        ));
    }
    out.push_str(&format!(
        "\n{} sheet{} shown\n",
        sheets.len(),
        plural(sheets.len())
    ));
    out
}

pub fn render_card(card: &ContactCard) -> String {
    let mut out = format!("▸ {}\n", card.title);

    for (column, value) in &card.details {
        out.push_str(&format!("    {}: {}\n", column, value));
    }
    for email in &card.emails {
        out.push_str(&format!("    ✉️  {}\n", email));
    }
    for action in &card.actions {
        out.push_str(&format!("    [{}] {}\n", action.label(), action.href()));
    }

    out
}

pub fn render_cards(view: &SheetView, state: &CardListState) -> String {
    let mut out = format!("━━ {} ━━\n\n", view.title);

    match state {
        CardListState::Empty => out.push_str("No data available in this sheet.\n"),
        CardListState::NoMatches => out.push_str("No data found for this search.\n"),
        CardListState::Cards(cards) => {
            for card in cards {
                out.push_str(&render_card(card));
                out.push('\n');
            }
            out.push_str(&format!(
                "{} result{} shown\n",
                cards.len(),
                plural(cards.len())
            ));
        }
    }

    out
}

pub fn render_status(status: &AuthStatus) -> String {
    let session = if status.session_active {
        "signed in"
    } else {
        "not signed in"
    };

    let token = match &status.token {
        TokenState::Absent => "none (run `auth-url` to authorize)".to_string(),
        TokenState::Expired => "expired (run `auth-url` to authorize again)".to_string(),
        TokenState::Valid(stored) => {
            let expires = Utc
                .timestamp_millis_opt(stored.expires_at_epoch_millis)
                .single();
            format!("valid until {}", format_time(expires))
        }
    };

    format!("Session:      {}\nSheets token: {}\n", session, token)
}
