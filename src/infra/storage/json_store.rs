use crate::core::auth::{KeyValueStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

/// JSON file store. Every key lives in one flat object:
/// { "google_sheets_token": "...", "google_sheets_token_expires": "..." }
///
/// The file is read once on open and rewritten on every change.
pub struct JsonKeyValueStore {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, String>>,
}

impl JsonKeyValueStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let cache = if fs::try_exists(&path).await? {
            let text = fs::read_to_string(&path).await?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = cache.len(), "Opened key-value store");

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    async fn persist(&self, snapshot: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let text = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, text).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Hold the write lock through the write so two updates can't interleave
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        next.insert(key.to_string(), value.to_string());
        // The cache only changes once the file has been written
        self.persist(&next).await?;
        *cache = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        if !cache.contains_key(key) {
            return Ok(());
        }
        let mut next = cache.clone();
        next.remove(key);
        self.persist(&next).await?;
        *cache = next;
        Ok(())
    }
}
