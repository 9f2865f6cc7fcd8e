// Orchestrates a sheet load: token -> gateway -> parser -> primary column.
//
// Failures fall into three groups the adapter reacts to differently:
// - no token, or Google answered 403: ask the user to authorize again
// - anything else (other statuses, network, bad JSON): show a retry hint
// - an empty sheet is not a failure at all, it is CardListState::Empty

use async_trait::async_trait;
use thiserror::Error;

use super::cards::{build_card, ContactCard};
use super::phone::PhoneProfile;
use super::primary_column::select_primary;
use super::schema_parser::parse;
use super::search::filter_rows;
use super::sheet_models::{ColumnInfo, Grid, ParsedRow, SheetSummary, SpreadsheetInfo};
use crate::core::auth::{Clock, KeyValueStore, StoreError, TokenManager};

/// Range fetched when the first tab's title is unknown.
pub const DEFAULT_RANGE: &str = "A1:Z1000";

/// Title shown when the spreadsheet metadata has none.
pub const DEFAULT_SHEET_TITLE: &str = "Sheet";

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("No Google Sheets access token; authorization required")]
    AuthMissing,
    #[error("Google refused access (403): {0}")]
    Forbidden(String),
    #[error("Google API error: {0}")]
    Api(String),
    #[error("Request failed: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl SheetsError {
    /// True when the fix is a fresh authorization rather than a retry.
    pub fn needs_reauthorization(&self) -> bool {
        matches!(self, SheetsError::AuthMissing | SheetsError::Forbidden(_))
    }
}

/// The Drive and Sheets REST calls the core relies on. One attempt per call.
#[async_trait]
pub trait SheetsGateway: Send + Sync {
    /// Spreadsheets visible to the token, most recently modified first.
    async fn list_spreadsheets(&self, token: &str) -> Result<Vec<SheetSummary>, SheetsError>;

    async fn spreadsheet_info(
        &self,
        token: &str,
        spreadsheet_id: &str,
    ) -> Result<SpreadsheetInfo, SheetsError>;

    /// Cell values for `range`. A missing `values` key reads as an empty grid.
    async fn values(
        &self,
        token: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Grid, SheetsError>;
}

/// What the card list should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardListState {
    /// The sheet has no data rows.
    Empty,
    /// Rows exist but the search term matched none of them.
    NoMatches,
    Cards(Vec<ContactCard>),
}

/// A loaded sheet: parsed once per load, searched as often as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetView {
    pub title: String,
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<ParsedRow>,
    /// Index into `columns`.
    primary: Option<usize>,
}

impl SheetView {
    pub fn from_grid(title: impl Into<String>, grid: &Grid) -> Self {
        let parsed = parse(grid);
        let primary = select_primary(&parsed.columns)
            .and_then(|p| parsed.columns.iter().position(|c| c.index == p.index));

        Self {
            title: title.into(),
            columns: parsed.columns,
            rows: parsed.rows,
            primary,
        }
    }

    pub fn primary_column(&self) -> Option<&ColumnInfo> {
        self.primary.and_then(|i| self.columns.get(i))
    }

    /// Cards for the rows matching `term` (all rows for an empty term).
    pub fn cards(&self, term: &str, profile: &PhoneProfile) -> CardListState {
        if self.rows.is_empty() {
            return CardListState::Empty;
        }

        let matching = filter_rows(&self.rows, term);
        if matching.is_empty() {
            return CardListState::NoMatches;
        }

        CardListState::Cards(
            matching
                .into_iter()
                .map(|row| build_card(row, &self.columns, self.primary_column(), profile))
                .collect(),
        )
    }
}

pub struct SheetService<G: SheetsGateway, S: KeyValueStore, C: Clock> {
    gateway: G,
    tokens: TokenManager<S, C>,
}

impl<G, S, C> SheetService<G, S, C>
where
    G: SheetsGateway,
    S: KeyValueStore,
    C: Clock,
{
    pub fn new(gateway: G, tokens: TokenManager<S, C>) -> Self {
        Self { gateway, tokens }
    }

    async fn token(&self) -> Result<String, SheetsError> {
        self.tokens.read().await?.ok_or(SheetsError::AuthMissing)
    }

    pub async fn list_sheets(&self) -> Result<Vec<SheetSummary>, SheetsError> {
        let token = self.token().await?;
        let sheets = self.gateway.list_spreadsheets(&token).await?;
        tracing::info!("Listed {} spreadsheets", sheets.len());
        Ok(sheets)
    }

    /// Loads the first tab of a spreadsheet. `range` overrides the tab-derived
    /// range.
    pub async fn load_sheet(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
    ) -> Result<SheetView, SheetsError> {
        let token = self.token().await?;

        let info = self.gateway.spreadsheet_info(&token, spreadsheet_id).await?;
        let title = info
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_SHEET_TITLE.to_string());

        let range = match range {
            Some(r) => r.to_string(),
            None => info
                .first_tab_title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_RANGE.to_string()),
        };

        let grid = self.gateway.values(&token, spreadsheet_id, &range).await?;
        let view = SheetView::from_grid(title, &grid);

        tracing::info!(
            spreadsheet_id,
            range = %range,
            columns = view.columns.len(),
            rows = view.rows.len(),
            "Loaded sheet"
        );

        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::token_manager::tests::ManualClock;
    use crate::core::auth::TokenPolicy;
    use crate::core::sheets::sheet_models::ColumnType;
    use crate::infra::storage::InMemoryKeyValueStore;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    const T: i64 = 1_700_000_000_000;

    #[derive(Default)]
    struct FakeGateway {
        forbidden: bool,
        info: SpreadsheetInfo,
        grid: Grid,
        requested_ranges: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SheetsGateway for FakeGateway {
        async fn list_spreadsheets(&self, token: &str) -> Result<Vec<SheetSummary>, SheetsError> {
            if self.forbidden {
                return Err(SheetsError::Forbidden("Forbidden".to_string()));
            }
            assert_eq!(token, "ya29.token");
            Ok(vec![SheetSummary {
                id: "abc".to_string(),
                name: "Clients".to_string(),
                created_time: None,
                modified_time: None,
            }])
        }

        async fn spreadsheet_info(
            &self,
            _token: &str,
            _spreadsheet_id: &str,
        ) -> Result<SpreadsheetInfo, SheetsError> {
            if self.forbidden {
                return Err(SheetsError::Forbidden("Forbidden".to_string()));
            }
            Ok(self.info.clone())
        }

        async fn values(
            &self,
            _token: &str,
            _spreadsheet_id: &str,
            range: &str,
        ) -> Result<Grid, SheetsError> {
            self.requested_ranges.lock().unwrap().push(range.to_string());
            Ok(self.grid.clone())
        }
    }

    async fn service(
        gateway: FakeGateway,
        with_token: bool,
    ) -> SheetService<FakeGateway, Arc<InMemoryKeyValueStore>, ManualClock> {
        let tokens = TokenManager::new(
            Arc::new(InMemoryKeyValueStore::new()),
            ManualClock::at(T),
            TokenPolicy::default(),
        );
        if with_token {
            tokens.store("ya29.token").await.unwrap();
        }
        SheetService::new(gateway, tokens)
    }

    fn contacts_grid() -> Grid {
        vec![
            vec![json!("Email"), json!("Nom complet"), json!("Téléphone")],
            vec![json!("a@x.io"), json!("Alice Martin"), json!("0225551234")],
            vec![json!("b@x.io"), json!("Bob Dupont"), json!("+22961234567")],
            vec![json!(""), json!(""), json!("")],
        ]
    }

    #[tokio::test]
    async fn test_missing_token_needs_authorization() {
        let service = service(FakeGateway::default(), false).await;

        let err = service.list_sheets().await.unwrap_err();

        assert!(matches!(err, SheetsError::AuthMissing));
        assert!(err.needs_reauthorization());
    }

    #[tokio::test]
    async fn test_forbidden_needs_authorization() {
        let gateway = FakeGateway {
            forbidden: true,
            ..FakeGateway::default()
        };
        let service = service(gateway, true).await;

        let err = service.load_sheet("abc", None).await.unwrap_err();
        assert!(err.needs_reauthorization());
        assert!(!SheetsError::Api("Internal Server Error".to_string()).needs_reauthorization());
    }

    #[tokio::test]
    async fn test_list_sheets_with_token() {
        let service = service(FakeGateway::default(), true).await;
        let sheets = service.list_sheets().await.unwrap();
        assert_eq!(sheets[0].name, "Clients");
    }

    #[tokio::test]
    async fn test_load_sheet_uses_first_tab_as_range() {
        let gateway = FakeGateway {
            info: SpreadsheetInfo {
                title: Some("CRM".to_string()),
                first_tab_title: Some("Contacts".to_string()),
            },
            grid: contacts_grid(),
            ..FakeGateway::default()
        };
        let service = service(gateway, true).await;

        let view = service.load_sheet("abc", None).await.unwrap();

        assert_eq!(view.title, "CRM");
        assert_eq!(view.rows.len(), 2);
        assert_eq!(
            view.primary_column().map(|c| c.name.as_str()),
            Some("Nom complet")
        );
        assert_eq!(view.columns[0].column_type, ColumnType::Email);
        assert_eq!(view.columns[2].column_type, ColumnType::Phone);
        assert_eq!(
            *service.gateway.requested_ranges.lock().unwrap(),
            vec!["Contacts".to_string()]
        );
    }

    #[tokio::test]
    async fn test_load_sheet_defaults() {
        let service = service(FakeGateway::default(), true).await;

        let view = service.load_sheet("abc", None).await.unwrap();
        assert_eq!(view.title, DEFAULT_SHEET_TITLE);
        assert!(view.columns.is_empty());
        assert_eq!(
            view.cards("", &PhoneProfile::default()),
            CardListState::Empty
        );

        service.load_sheet("abc", Some("B2:C9")).await.unwrap();
        assert_eq!(
            *service.gateway.requested_ranges.lock().unwrap(),
            vec![DEFAULT_RANGE.to_string(), "B2:C9".to_string()]
        );
    }

    #[test]
    fn test_cards_distinguish_empty_from_no_matches() {
        let profile = PhoneProfile::default();
        let view = SheetView::from_grid("CRM", &contacts_grid());

        let CardListState::Cards(cards) = view.cards("", &profile) else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Alice Martin");

        let CardListState::Cards(cards) = view.cards("dupont", &profile) else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Bob Dupont");

        assert_eq!(view.cards("nobody", &profile), CardListState::NoMatches);

        let header_only = SheetView::from_grid("CRM", &vec![vec![json!("Name")]]);
        assert_eq!(header_only.cards("x", &profile), CardListState::Empty);
    }
}
