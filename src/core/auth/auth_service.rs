use std::time::Duration;

use super::key_value_store::{KeyValueStore, StoreError};
use super::oauth::{route_callback, AuthError, CallbackRoute, OAuthClient};
use super::session::SessionFlag;
use super::token_manager::{Clock, TokenManager, TokenPolicy, TokenState};

/// What handling a callback did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The elevated token is stored and usable.
    TokenStored,
    /// The primary session was recorded.
    SessionStarted,
    /// Nothing to do; the user has to sign in again.
    LoginRequired,
}

/// Snapshot of both sign-ins, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStatus {
    pub session_active: bool,
    pub token: TokenState,
}

/// Ties the OAuth client to the token lifecycle and the session flag.
pub struct AuthService<O: OAuthClient, S: KeyValueStore + Clone, C: Clock + Clone> {
    oauth: O,
    tokens: TokenManager<S, C>,
    session: SessionFlag<S>,
}

impl<O, S, C> AuthService<O, S, C>
where
    O: OAuthClient,
    S: KeyValueStore + Clone,
    C: Clock + Clone,
{
    pub fn new(oauth: O, store: S, clock: C, policy: TokenPolicy) -> Self {
        Self {
            oauth,
            tokens: TokenManager::new(store.clone(), clock, policy),
            session: SessionFlag::new(store),
        }
    }

    pub fn authorization_url(&self) -> Result<String, AuthError> {
        self.oauth.authorization_url()
    }

    /// Exchanges `code` and stores the elevated token.
    ///
    /// The stored lifetime is the policy's fixed lifetime unless the policy
    /// opts into the response's `expires_in`.
    pub async fn complete_elevated_grant(&self, code: &str) -> Result<(), AuthError> {
        if code.is_empty() {
            return Err(AuthError::MissingCode);
        }

        let grant = self.oauth.exchange_code(code).await?;
        if grant.access_token.is_empty() {
            return Err(AuthError::NoToken);
        }

        if self.tokens.policy().honor_expires_in {
            self.tokens
                .store_with_expiry(&grant.access_token, Duration::from_secs(grant.expires_in))
                .await?;
        } else {
            if grant.expires_in != self.tokens.policy().lifetime.as_secs() {
                tracing::debug!(
                    expires_in = grant.expires_in,
                    "Ignoring reported token lifetime, using the configured one"
                );
            }
            self.tokens.store(&grant.access_token).await?;
        }

        Ok(())
    }

    /// Handles a request to the shared OAuth callback.
    pub async fn handle_callback(
        &self,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<CallbackOutcome, AuthError> {
        match route_callback(code, state) {
            CallbackRoute::ElevatedGrant { code } => {
                self.complete_elevated_grant(&code).await?;
                Ok(CallbackOutcome::TokenStored)
            }
            CallbackRoute::PrimarySession { .. } => {
                // the hosted provider exchanges this code itself
                self.session.mark_signed_in().await?;
                Ok(CallbackOutcome::SessionStarted)
            }
            CallbackRoute::Login => Ok(CallbackOutcome::LoginRequired),
        }
    }

    pub async fn status(&self) -> Result<AuthStatus, StoreError> {
        Ok(AuthStatus {
            session_active: self.session.is_signed_in().await?,
            token: self.tokens.state().await?,
        })
    }

    /// Drops the elevated token and the session flag.
    pub async fn sign_out(&self) -> Result<(), StoreError> {
        self.tokens.clear().await?;
        self.session.sign_out().await
    }
}
