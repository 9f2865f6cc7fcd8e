pub mod cards;
pub mod classifier;
pub mod phone;
pub mod primary_column;
pub mod schema_parser;
pub mod search;
pub mod sheet_models;
pub mod sheet_service;

pub use cards::ContactCard;
pub use phone::PhoneProfile;
pub use sheet_models::{Grid, SheetSummary, SpreadsheetInfo};
pub use sheet_service::{CardListState, SheetService, SheetView, SheetsError, SheetsGateway};
