//! Local key-value store abstract Trait

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CoreResult;

/// Local Store Trait
///
/// A device-scoped string store (browser `localStorage`, a file, ...). Several
/// execution contexts may share it, so writers that depend on the previous value
/// must go through [`LocalStore::compare_and_set`].
///
/// Platform implementation:
/// - `InMemoryLocalStore` (this crate)
/// - `JsonFileLocalStore` (app crate)
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read the raw value of a key
    async fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Unconditionally write a key
    async fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Delete a key (absent keys are ignored)
    async fn remove(&self, key: &str) -> CoreResult<()>;

    /// Atomically replace the value of `key` with `new` if it currently equals `expected`
    ///
    /// # Arguments
    /// * `key` - Storage key
    /// * `expected` - Value read before the update, `None` if the key was absent
    /// * `new` - Value to write
    ///
    /// # Returns
    /// * `Ok(true)` - written
    /// * `Ok(false)` - the value changed in between, nothing written
    async fn compare_and_set(&self, key: &str, expected: Option<&str>, new: &str)
        -> CoreResult<bool>;
}

/// In-memory local store
///
/// Default implementation, available on all platforms.
#[derive(Clone, Default)]
pub struct InMemoryLocalStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryLocalStore {
    /// Create a new in-memory store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for InMemoryLocalStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> CoreResult<bool> {
        let mut entries = self.entries.write().await;
        if entries.get(key).map(String::as_str) != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), new.to_string());
        Ok(true)
    }
}
