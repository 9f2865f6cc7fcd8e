use super::key_value_store::{KeyValueStore, StoreError};

/// Flag recording that the primary (delegated) sign-in happened. The hosted
/// provider owns the actual session; we only remember that there is one.
pub const SESSION_KEY: &str = "app_session_active";

pub struct SessionFlag<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionFlag<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn mark_signed_in(&self) -> Result<(), StoreError> {
        self.store.set(SESSION_KEY, "true").await
    }

    pub async fn is_signed_in(&self) -> Result<bool, StoreError> {
        Ok(self.store.get(SESSION_KEY).await?.as_deref() == Some("true"))
    }

    pub async fn sign_out(&self) -> Result<(), StoreError> {
        self.store.remove(SESSION_KEY).await
    }
}
