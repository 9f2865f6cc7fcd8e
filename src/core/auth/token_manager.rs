// Lifecycle of the elevated-scope Google access token.
//
// The token and its expiry live under two fixed keys:
//   google_sheets_token          -> the bearer token
//   google_sheets_token_expires  -> expiry, epoch milliseconds as a decimal string
//
// States:
//   Absent  - either key missing (or the token is empty)
//   Valid   - both present and now <= expiry
//   Expired - both present and now > expiry (or the expiry is unreadable)
//
// There is no refresh path. Once the token is gone the user has to go through
// the authorization-code flow again.

use std::time::Duration;

use super::key_value_store::{KeyValueStore, StoreError};

pub const TOKEN_KEY: &str = "google_sheets_token";
pub const TOKEN_EXPIRES_KEY: &str = "google_sheets_token_expires";

/// Lifetime assumed for a freshly stored token.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// How long stored tokens are considered valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Lifetime used by [`TokenManager::store`].
    pub lifetime: Duration,
    /// When set, the `expires_in` of the OAuth response is used instead of
    /// `lifetime`.
    pub honor_expires_in: bool,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            lifetime: DEFAULT_TOKEN_LIFETIME,
            honor_expires_in: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    pub expires_at_epoch_millis: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Absent,
    Valid(StoredToken),
    Expired,
}

pub struct TokenManager<S: KeyValueStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    policy: TokenPolicy,
}

impl<S: KeyValueStore, C: Clock> TokenManager<S, C> {
    pub fn new(store: S, clock: C, policy: TokenPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> TokenPolicy {
        self.policy
    }

    /// Stores `token` with the configured lifetime. The token is Valid
    /// immediately afterwards.
    pub async fn store(&self, token: &str) -> Result<StoredToken, StoreError> {
        self.store_with_lifetime(token, self.policy.lifetime).await
    }

    /// Stores `token` with the lifetime reported by the OAuth response.
    pub async fn store_with_expiry(
        &self,
        token: &str,
        expires_in: Duration,
    ) -> Result<StoredToken, StoreError> {
        self.store_with_lifetime(token, expires_in).await
    }

    async fn store_with_lifetime(
        &self,
        token: &str,
        lifetime: Duration,
    ) -> Result<StoredToken, StoreError> {
        let lifetime_millis = i64::try_from(lifetime.as_millis()).unwrap_or(i64::MAX);
        let expires_at = self.clock.now_millis().saturating_add(lifetime_millis);

        self.store.set(TOKEN_KEY, token).await?;
        self.store
            .set(TOKEN_EXPIRES_KEY, &expires_at.to_string())
            .await?;

        tracing::info!(expires_at, "Stored Google Sheets access token");

        Ok(StoredToken {
            access_token: token.to_string(),
            expires_at_epoch_millis: expires_at,
        })
    }

    /// Inspects the stored entry without changing it.
    pub async fn state(&self) -> Result<TokenState, StoreError> {
        let token = self.store.get(TOKEN_KEY).await?.filter(|t| !t.is_empty());
        let expires = self
            .store
            .get(TOKEN_EXPIRES_KEY)
            .await?
            .filter(|e| !e.is_empty());

        let (Some(access_token), Some(expires)) = (token, expires) else {
            return Ok(TokenState::Absent);
        };

        // Strict parse: trailing garbage ("1700000000000x") is not a valid expiry.
        let Ok(expires_at) = expires.trim().parse::<i64>() else {
            tracing::warn!(value = %expires, "Unreadable token expiry, treating as expired");
            return Ok(TokenState::Expired);
        };

        if self.clock.now_millis() > expires_at {
            return Ok(TokenState::Expired);
        }

        Ok(TokenState::Valid(StoredToken {
            access_token,
            expires_at_epoch_millis: expires_at,
        }))
    }

    /// Returns the token while it is valid. An expired entry is cleared on the
    /// way out.
    pub async fn read(&self) -> Result<Option<String>, StoreError> {
        match self.state().await? {
            TokenState::Valid(stored) => Ok(Some(stored.access_token)),
            TokenState::Expired => {
                tracing::info!("Google Sheets access token expired");
                self.clear().await?;
                Ok(None)
            }
            TokenState::Absent => Ok(None),
        }
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(TOKEN_KEY).await?;
        self.store.remove(TOKEN_EXPIRES_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::infra::storage::InMemoryKeyValueStore;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    /// Clock that only moves when told to.
    #[derive(Clone, Default)]
    pub(crate) struct ManualClock(Arc<AtomicI64>);

    impl ManualClock {
        pub(crate) fn at(millis: i64) -> Self {
            Self(Arc::new(AtomicI64::new(millis)))
        }

        pub(crate) fn set(&self, millis: i64) {
            self.0.store(millis, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    const T: i64 = 1_700_000_000_000;

    fn manager() -> (
        TokenManager<Arc<InMemoryKeyValueStore>, ManualClock>,
        Arc<InMemoryKeyValueStore>,
        ManualClock,
    ) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let clock = ManualClock::at(T);
        let manager = TokenManager::new(store.clone(), clock.clone(), TokenPolicy::default());
        (manager, store, clock)
    }

    #[tokio::test]
    async fn test_absent_by_default() {
        let (manager, _, _) = manager();
        assert_eq!(manager.state().await.unwrap(), TokenState::Absent);
        assert_eq!(manager.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_writes_both_keys() {
        let (manager, store, _) = manager();
        let stored = manager.store("ya29.token").await.unwrap();

        assert_eq!(stored.expires_at_epoch_millis, T + 3_600_000);
        assert_eq!(
            store.get(TOKEN_KEY).await.unwrap().as_deref(),
            Some("ya29.token")
        );
        assert_eq!(
            store.get(TOKEN_EXPIRES_KEY).await.unwrap(),
            Some((T + 3_600_000).to_string())
        );
    }

    #[tokio::test]
    async fn test_token_valid_until_expiry() {
        let (manager, _, clock) = manager();
        manager.store("ya29.token").await.unwrap();

        clock.set(T + 3_599_000);
        assert_eq!(
            manager.read().await.unwrap().as_deref(),
            Some("ya29.token")
        );

        // the boundary itself is still valid: expiry needs now > expires_at
        clock.set(T + 3_600_000);
        assert!(manager.read().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_read_clears_storage() {
        let (manager, store, clock) = manager();
        manager.store("ya29.token").await.unwrap();

        clock.set(T + 3_601_000);
        assert_eq!(manager.state().await.unwrap(), TokenState::Expired);
        assert_eq!(manager.read().await.unwrap(), None);

        assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get(TOKEN_EXPIRES_KEY).await.unwrap(), None);
        assert_eq!(manager.state().await.unwrap(), TokenState::Absent);
    }

    #[tokio::test]
    async fn test_clear_from_any_state() {
        let (manager, _, _) = manager();
        manager.clear().await.unwrap();
        assert_eq!(manager.state().await.unwrap(), TokenState::Absent);

        manager.store("ya29.token").await.unwrap();
        manager.clear().await.unwrap();
        assert_eq!(manager.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_with_expiry_uses_reported_lifetime() {
        let (manager, _, clock) = manager();
        manager
            .store_with_expiry("short", Duration::from_secs(60))
            .await
            .unwrap();

        clock.set(T + 61_000);
        assert_eq!(manager.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_configured_lifetime() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let clock = ManualClock::at(T);
        let policy = TokenPolicy {
            lifetime: Duration::from_secs(600),
            honor_expires_in: false,
        };
        let manager = TokenManager::new(store, clock.clone(), policy);

        manager.store("ya29.token").await.unwrap();
        clock.set(T + 601_000);
        assert_eq!(manager.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_half_written_entry_is_absent() {
        let (manager, store, _) = manager();
        store.set(TOKEN_KEY, "ya29.token").await.unwrap();
        assert_eq!(manager.state().await.unwrap(), TokenState::Absent);
        // absent entries are not cleaned up
        manager.read().await.unwrap();
        assert!(store.get(TOKEN_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unreadable_expiry_counts_as_expired() {
        let (manager, store, _) = manager();
        store.set(TOKEN_KEY, "ya29.token").await.unwrap();
        store.set(TOKEN_EXPIRES_KEY, "soon").await.unwrap();

        assert_eq!(manager.read().await.unwrap(), None);
        assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);

        store.set(TOKEN_KEY, "ya29.token").await.unwrap();
        store.set(TOKEN_EXPIRES_KEY, "9999999999999x").await.unwrap();

        assert_eq!(manager.state().await.unwrap(), TokenState::Expired);
        assert_eq!(manager.read().await.unwrap(), None);
        assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get(TOKEN_EXPIRES_KEY).await.unwrap(), None);
    }
}
