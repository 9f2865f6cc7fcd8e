// Google REST clients implementing the core's gateway and OAuth ports.

pub mod oauth_client;
pub mod sheets_client;

pub use oauth_client::GoogleOAuthClient;
pub use sheets_client::{grid_from_json, GoogleSheetsClient};
