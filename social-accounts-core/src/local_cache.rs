//! Local account cache
//!
//! Owns the serialized list of provisional accounts kept in a [`LocalStore`]. Every
//! mutation is a read-modify-write guarded by `compare_and_set`, so two contexts
//! sharing the store (two tabs, two windows) cannot silently overwrite each other.

use std::sync::Arc;

use crate::config::ReconcileConfig;
use crate::error::{CoreError, CoreResult};
use crate::traits::LocalStore;
use crate::types::{Account, AccountStats};

/// Local account cache backed by a single JSON blob
pub struct LocalAccountCache {
    store: Arc<dyn LocalStore>,
    key: String,
    max_attempts: u32,
}

impl LocalAccountCache {
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>, config: &ReconcileConfig) -> Self {
        Self {
            store,
            key: config.cache_key.clone(),
            max_attempts: config.cache_update_retries.max(1),
        }
    }

    /// Storage key of the blob
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Point-in-time snapshot of the cached accounts, in stored order.
    ///
    /// An unreadable blob is logged and read as empty.
    pub async fn load(&self) -> CoreResult<Vec<Account>> {
        let raw = self.store.get(&self.key).await?;
        Ok(self.decode(raw.as_deref()))
    }

    pub async fn find(&self, id: &str) -> CoreResult<Option<Account>> {
        Ok(self.load().await?.into_iter().find(|a| a.id == id))
    }

    /// Append a provisional account.
    ///
    /// Fails with `DuplicateAccount` when the cache already holds the same
    /// platform/username.
    pub async fn add(&self, account: Account) -> CoreResult<Account> {
        self.update(|accounts| {
            let key = account.dedup_key();
            if accounts.iter().any(|a| a.dedup_key() == key) {
                return Err(CoreError::DuplicateAccount {
                    platform: account.platform,
                    username: account.username.clone(),
                });
            }
            accounts.push(account.clone());
            Ok(account.clone())
        })
        .await
    }

    /// Remove an account by id. Returns whether it was present.
    pub async fn remove(&self, id: &str) -> CoreResult<bool> {
        self.update(|accounts| {
            let before = accounts.len();
            accounts.retain(|a| a.id != id);
            Ok(accounts.len() != before)
        })
        .await
    }

    /// Overwrite the counters of a cached account.
    pub async fn update_stats(&self, id: &str, stats: &AccountStats) -> CoreResult<Option<Account>> {
        self.update(|accounts| {
            Ok(accounts.iter_mut().find(|a| a.id == id).map(|account| {
                account.apply_stats(stats);
                account.clone()
            }))
        })
        .await
    }

    /// Apply `mutate` to the current list and write it back atomically.
    ///
    /// `mutate` runs again on a fresh snapshot whenever another writer got in between,
    /// so it must not have side effects beyond the list it is given. An error from
    /// `mutate` aborts without writing.
    pub async fn update<T, F>(&self, mut mutate: F) -> CoreResult<T>
    where
        F: FnMut(&mut Vec<Account>) -> CoreResult<T> + Send,
        T: Send,
    {
        for attempt in 1..=self.max_attempts {
            let raw = self.store.get(&self.key).await?;
            let mut accounts = self.decode(raw.as_deref());
            let result = mutate(&mut accounts)?;

            let encoded = serde_json::to_string(&accounts)
                .map_err(|e| CoreError::Serialization(e.to_string()))?;
            if raw.as_deref() == Some(encoded.as_str()) {
                return Ok(result);
            }

            if self
                .store
                .compare_and_set(&self.key, raw.as_deref(), &encoded)
                .await?
            {
                return Ok(result);
            }
            log::debug!(
                "Local cache {} changed concurrently, retrying ({attempt}/{})",
                self.key,
                self.max_attempts
            );
        }

        log::warn!(
            "Local cache {} update abandoned after {} attempts",
            self.key,
            self.max_attempts
        );
        Err(CoreError::LocalCache(format!(
            "concurrent modification of {} after {} attempts",
            self.key, self.max_attempts
        )))
    }

    fn decode(&self, raw: Option<&str>) -> Vec<Account> {
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<Account>>(raw) {
            Ok(accounts) => accounts,
            Err(e) => {
                log::warn!("Local cache {} is malformed, treating as empty: {e}", self.key);
                Vec::new()
            }
        }
    }
}
