use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::core::auth::oauth::{
    authorization_params, exchange_form, AUTHORIZATION_ENDPOINT, TOKEN_ENDPOINT,
};
use crate::core::auth::{AuthError, OAuthClient, OAuthConfig, TokenGrant};

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
    refresh_token: Option<String>,
}

/// Google's authorization-code grant: builds the consent URL and exchanges
/// the returned code at the token endpoint.
pub struct GoogleOAuthClient {
    client: Client,
    config: OAuthConfig,
    token_endpoint: String,
}

impl GoogleOAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            token_endpoint: TOKEN_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl OAuthClient for GoogleOAuthClient {
    fn authorization_url(&self) -> Result<String, AuthError> {
        let url = Url::parse_with_params(AUTHORIZATION_ENDPOINT, authorization_params(&self.config))
            .map_err(|e| AuthError::InvalidUrl(e.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthError> {
        let form = exchange_form(&self.config, code)?;

        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!("Token exchange error ({}): {}", status, text);
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                message: text,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        tracing::info!("Exchanged authorization code for a Google access token");

        Ok(TokenGrant {
            access_token: token.access_token.ok_or(AuthError::NoToken)?,
            expires_in: token.expires_in,
            refresh_token: token.refresh_token,
        })
    }
}
