// In-memory KeyValueStore.
// Used by tests and by `--token` runs, where the token must not be written to disk.

use crate::core::auth::{KeyValueStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;

/// **DashMap:** a concurrent HashMap, so the store can be shared across tasks
/// without wrapping it in a Mutex.
pub struct InMemoryKeyValueStore {
    data: DashMap<String, String>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.data.remove(key);
        Ok(())
    }
}
