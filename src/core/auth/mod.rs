// Auth: the elevated Google token lifecycle, the OAuth boundary and the
// primary-session flag.

pub mod auth_service;
pub mod key_value_store;
pub mod oauth;
pub mod session;
pub mod token_manager;

pub use auth_service::{AuthService, AuthStatus, CallbackOutcome};
pub use key_value_store::{KeyValueStore, StoreError};
pub use oauth::{AuthError, OAuthClient, OAuthConfig, TokenGrant};
pub use token_manager::{Clock, SystemClock, TokenManager, TokenPolicy, TokenState};
