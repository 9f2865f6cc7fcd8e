// OAuth boundary for the elevated Drive/Sheets grant.
//
// The app has two sign-ins sharing one redirect URI:
// 1. the primary session, owned by a hosted auth provider
// 2. a direct Google authorization-code grant for read access to Drive and
//    Sheets, tagged with `state=google_sheets_access`
//
// The callback router tells the two apart by that state value.

use async_trait::async_trait;
use thiserror::Error;

use super::key_value_store::StoreError;

pub const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

/// `state` value marking the elevated grant on the shared callback.
pub const ELEVATED_GRANT_STATE: &str = "google_sheets_access";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No authorization code provided")]
    MissingCode,
    #[error("GOOGLE_CLIENT_SECRET is not configured")]
    MissingClientSecret,
    #[error("Token exchange failed ({status}): {message}")]
    Exchange { status: u16, message: String },
    #[error("No access token in the token response")]
    NoToken,
    #[error("Request failed: {0}")]
    Network(String),
    #[error("Invalid OAuth URL: {0}")]
    InvalidUrl(String),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Client registration used for both the authorization URL and the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    /// Only needed for the code exchange.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

/// Successful code-for-token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

/// Where a request to the shared callback should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackRoute {
    /// Exchange the code for the elevated Drive/Sheets token.
    ElevatedGrant { code: String },
    /// Hand the code to the hosted provider for the primary session.
    PrimarySession { code: String },
    /// Nothing usable; send the user back to sign in.
    Login,
}

/// Routes a callback by its `code` and `state` query parameters.
pub fn route_callback(code: Option<&str>, state: Option<&str>) -> CallbackRoute {
    let code = code.filter(|c| !c.is_empty());
    let state = state.filter(|s| !s.is_empty());

    match (code, state) {
        (Some(code), Some(ELEVATED_GRANT_STATE)) => CallbackRoute::ElevatedGrant {
            code: code.to_string(),
        },
        (Some(code), None) => CallbackRoute::PrimarySession {
            code: code.to_string(),
        },
        _ => CallbackRoute::Login,
    }
}

/// Query parameters of the elevated-scope authorization request, in the order
/// they are sent.
pub fn authorization_params(config: &OAuthConfig) -> Vec<(&'static str, String)> {
    vec![
        ("client_id", config.client_id.clone()),
        ("redirect_uri", config.redirect_uri.clone()),
        ("response_type", "code".to_string()),
        (
            "scope",
            [DRIVE_READONLY_SCOPE, SHEETS_READONLY_SCOPE].join(" "),
        ),
        ("access_type", "offline".to_string()),
        ("prompt", "consent".to_string()),
        ("state", ELEVATED_GRANT_STATE.to_string()),
    ]
}

/// Form body of the code-for-token exchange.
pub fn exchange_form(config: &OAuthConfig, code: &str) -> Result<Vec<(&'static str, String)>, AuthError> {
    if code.is_empty() {
        return Err(AuthError::MissingCode);
    }
    let client_secret = config
        .client_secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(AuthError::MissingClientSecret)?;

    Ok(vec![
        ("code", code.to_string()),
        ("client_id", config.client_id.clone()),
        ("client_secret", client_secret.to_string()),
        ("redirect_uri", config.redirect_uri.clone()),
        ("grant_type", "authorization_code".to_string()),
    ])
}

/// The identity provider's side of the elevated grant.
#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// URL the user opens to grant Drive/Sheets read access.
    fn authorization_url(&self) -> Result<String, AuthError>;

    /// Single-shot exchange of an authorization code.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthError>;
}
