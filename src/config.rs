// Configuration from the environment (and `.env`, loaded in main).
//
// Environment variables:
// - `GOOGLE_CLIENT_ID`              - OAuth client id (required)
// - `GOOGLE_CLIENT_SECRET`          - OAuth client secret, needed for `callback`
// - `APP_URL`                       - base URL; redirect URI is `{APP_URL}/auth/callback`
// - `SHEET_CARDS_STORE`             - path of the JSON key-value store
// - `WHATSAPP_COUNTRY_CODE`         - calling code replacing a leading 0 (default 229)
// - `GOOGLE_TOKEN_LIFETIME_SECS`    - lifetime given to stored tokens (default 3600)
// - `GOOGLE_TOKEN_HONOR_EXPIRES_IN` - use the token response's expires_in instead

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::auth::{OAuthConfig, TokenPolicy};
use crate::core::sheets::phone::DEFAULT_COUNTRY_CODE;
use crate::core::sheets::PhoneProfile;

pub const DEFAULT_APP_URL: &str = "http://localhost:3000";
pub const DEFAULT_STORE_PATH: &str = ".sheet_cards/storage.json";
const CALLBACK_PATH: &str = "/auth/callback";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub oauth: OAuthConfig,
    pub store_path: PathBuf,
    pub phone_profile: PhoneProfile,
    pub token_policy: TokenPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let client_id = get("GOOGLE_CLIENT_ID").ok_or(ConfigError::Missing("GOOGLE_CLIENT_ID"))?;
        let app_url = get("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string());
        let redirect_uri = format!("{}{}", app_url.trim_end_matches('/'), CALLBACK_PATH);

        let phone_profile = phone_profile(get("WHATSAPP_COUNTRY_CODE"))?;

        let mut token_policy = TokenPolicy::default();
        if let Some(value) = get("GOOGLE_TOKEN_LIFETIME_SECS") {
            let secs = value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "GOOGLE_TOKEN_LIFETIME_SECS",
                value: value.clone(),
            })?;
            token_policy.lifetime = Duration::from_secs(secs);
        }
        if let Some(value) = get("GOOGLE_TOKEN_HONOR_EXPIRES_IN") {
            token_policy.honor_expires_in = parse_bool(&value).ok_or(ConfigError::Invalid {
                name: "GOOGLE_TOKEN_HONOR_EXPIRES_IN",
                value,
            })?;
        }

        Ok(Self {
            oauth: OAuthConfig {
                client_id,
                client_secret: get("GOOGLE_CLIENT_SECRET"),
                redirect_uri,
            },
            store_path: get("SHEET_CARDS_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            phone_profile,
            token_policy,
        })
    }
}

/// Phone profile alone, for commands that never talk to Google.
pub fn phone_profile_from_env() -> Result<PhoneProfile, ConfigError> {
    phone_profile(
        std::env::var("WHATSAPP_COUNTRY_CODE")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    )
}

fn phone_profile(country_code: Option<String>) -> Result<PhoneProfile, ConfigError> {
    let country_code = country_code.unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string());
    let profile = PhoneProfile::new(country_code.clone());
    if profile.country_code.is_empty() {
        return Err(ConfigError::Invalid {
            name: "WHATSAPP_COUNTRY_CODE",
            value: country_code,
        });
    }
    Ok(profile)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
