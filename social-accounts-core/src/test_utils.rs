#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Test helper module
//!
//! Provides mock implementations and convenient test factory methods.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::{ReconcileConfig, DEFAULT_CACHE_KEY};
use crate::error::{CoreError, CoreResult};
use crate::services::{ReconciliationService, ServiceContext};
use crate::traits::{
    AuthenticationFlow, InMemoryLocalStore, LocalStore, RemoteAccountRepository, TokenRefresher,
};
use crate::types::{
    username_key, Account, AccountMetadata, AccountStats, AuthorizedProfile, NewRemoteAccount,
    Platform, Session,
};

// ===== MockLocalStore =====

pub struct MockLocalStore {
    inner: InMemoryLocalStore,
    cas_calls: AtomicUsize,
    /// If Some, every call returns this error
    error: RwLock<Option<String>>,
}

impl MockLocalStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryLocalStore::new(),
            cas_calls: AtomicUsize::new(0),
            error: RwLock::new(None),
        }
    }

    pub async fn set_error(&self, err: Option<String>) {
        *self.error.write().await = err;
    }

    pub async fn seed_raw(&self, key: &str, raw: &str) {
        self.inner.set(key, raw).await.unwrap();
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }

    /// Accounts stored under the default cache key
    pub async fn accounts(&self) -> Vec<Account> {
        self.raw(DEFAULT_CACHE_KEY)
            .await
            .map(|raw| serde_json::from_str(&raw).unwrap())
            .unwrap_or_default()
    }

    pub fn cas_count(&self) -> usize {
        self.cas_calls.load(Ordering::SeqCst)
    }

    async fn check(&self) -> CoreResult<()> {
        match *self.error.read().await {
            Some(ref msg) => Err(CoreError::LocalCache(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LocalStore for MockLocalStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        self.check().await?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.check().await?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        self.check().await?;
        self.inner.remove(key).await
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> CoreResult<bool> {
        self.cas_calls.fetch_add(1, Ordering::SeqCst);
        self.check().await?;
        self.inner.compare_and_set(key, expected, new).await
    }
}

/// Write accounts into the default cache key
pub async fn seed_local(store: &MockLocalStore, accounts: &[Account]) {
    let raw = serde_json::to_string(accounts).unwrap();
    store.seed_raw(DEFAULT_CACHE_KEY, &raw).await;
}

// ===== ContendedLocalStore =====

/// Simulates another context writing to the store right before our compare-and-set.
///
/// The first `conflicts` compare-and-set calls append `intruder` to the stored list
/// and report a conflict.
pub struct ContendedLocalStore {
    inner: InMemoryLocalStore,
    remaining_conflicts: AtomicU32,
    attempts: AtomicU32,
    intruder: Account,
}

impl ContendedLocalStore {
    pub fn new(conflicts: u32, intruder: Account) -> Self {
        Self {
            inner: InMemoryLocalStore::new(),
            remaining_conflicts: AtomicU32::new(conflicts),
            attempts: AtomicU32::new(0),
            intruder,
        }
    }

    pub fn cas_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalStore for ContendedLocalStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        self.inner.remove(key).await
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> CoreResult<bool> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.remaining_conflicts.load(Ordering::SeqCst) > 0 {
            self.remaining_conflicts.fetch_sub(1, Ordering::SeqCst);
            let mut accounts: Vec<Account> = self
                .inner
                .get(key)
                .await?
                .map(|raw| serde_json::from_str(&raw).unwrap())
                .unwrap_or_default();
            if !accounts.iter().any(|a| a.id == self.intruder.id) {
                accounts.push(self.intruder.clone());
            }
            self.inner
                .set(key, &serde_json::to_string(&accounts).unwrap())
                .await?;
            return Ok(false);
        }
        self.inner.compare_and_set(key, expected, new).await
    }
}

// ===== MockRemoteAccountRepository =====

pub struct MockRemoteAccountRepository {
    rows: RwLock<Vec<(String, Account)>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    inserted: RwLock<Vec<String>>,
    /// If Some, every call returns `Connection` with this message
    error: RwLock<Option<String>>,
    /// Username keys whose insert fails with `Connection`
    failing_inserts: RwLock<Vec<String>>,
}

impl MockRemoteAccountRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            calls: Mutex::new(HashMap::new()),
            inserted: RwLock::new(Vec::new()),
            error: RwLock::new(None),
            failing_inserts: RwLock::new(Vec::new()),
        }
    }

    pub async fn set_error(&self, err: Option<String>) {
        *self.error.write().await = err;
    }

    pub async fn fail_insert_for(&self, username: &str) {
        self.failing_inserts.write().await.push(username_key(username));
    }

    /// Insert an active remote account directly, bypassing call counting
    pub async fn seed(&self, user_id: &str, platform: Platform, username: &str) -> Account {
        let account = NewRemoteAccount {
            platform,
            username: username.to_string(),
            metadata: AccountMetadata::default(),
            created_at: chrono::Utc::now(),
        }
        .into_account(uuid::Uuid::new_v4().to_string());
        self.rows
            .write()
            .await
            .push((user_id.to_string(), account.clone()));
        account
    }

    pub async fn set_active(&self, id: &str, active: bool) {
        for (_, account) in self.rows.write().await.iter_mut() {
            if account.id == id {
                account.is_active = active;
            }
        }
    }

    pub async fn count_for(&self, user_id: &str) -> usize {
        self.rows
            .read()
            .await
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .count()
    }

    /// Usernames passed to successful `insert` calls, in call order
    pub async fn inserted_usernames(&self) -> Vec<String> {
        self.inserted.read().await.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    async fn enter(&self, op: &'static str) -> CoreResult<()> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
        match *self.error.read().await {
            Some(ref msg) => Err(CoreError::Connection(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteAccountRepository for MockRemoteAccountRepository {
    async fn find_by_user(&self, user_id: &str) -> CoreResult<Vec<Account>> {
        self.enter("find_by_user").await?;
        let mut accounts: Vec<Account> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, a)| a.clone())
            .collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn find_by_id(&self, user_id: &str, id: &str) -> CoreResult<Option<Account>> {
        self.enter("find_by_id").await?;
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|(owner, a)| owner == user_id && a.id == id)
            .map(|(_, a)| a.clone()))
    }

    async fn find_active(
        &self,
        user_id: &str,
        platform: Platform,
        username_key_value: &str,
    ) -> CoreResult<Option<Account>> {
        self.enter("find_active").await?;
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|(owner, a)| {
                owner == user_id
                    && a.is_active
                    && a.platform == platform
                    && username_key(&a.username) == username_key_value
            })
            .map(|(_, a)| a.clone()))
    }

    async fn insert(&self, user_id: &str, account: NewRemoteAccount) -> CoreResult<Account> {
        self.enter("insert").await?;
        let key = username_key(&account.username);
        if self.failing_inserts.read().await.contains(&key) {
            return Err(CoreError::Connection(format!("insert rejected for {key}")));
        }
        let username = account.username.clone();
        let created = account.into_account(uuid::Uuid::new_v4().to_string());
        self.rows
            .write()
            .await
            .push((user_id.to_string(), created.clone()));
        self.inserted.write().await.push(username);
        Ok(created)
    }

    async fn delete(&self, user_id: &str, id: &str) -> CoreResult<()> {
        self.enter("delete").await?;
        self.rows
            .write()
            .await
            .retain(|(owner, a)| !(owner == user_id && a.id == id));
        Ok(())
    }

    async fn update_stats(
        &self,
        user_id: &str,
        id: &str,
        stats: &AccountStats,
    ) -> CoreResult<Option<Account>> {
        self.enter("update_stats").await?;
        let mut rows = self.rows.write().await;
        Ok(rows
            .iter_mut()
            .find(|(owner, a)| owner == user_id && a.id == id)
            .map(|(_, account)| {
                account.apply_stats(stats);
                account.clone()
            }))
    }
}

// ===== MockTokenRefresher =====

pub struct MockTokenRefresher {
    refreshed: RwLock<Vec<String>>,
}

impl MockTokenRefresher {
    pub fn new() -> Self {
        Self {
            refreshed: RwLock::new(Vec::new()),
        }
    }

    pub async fn refreshed(&self) -> Vec<String> {
        self.refreshed.read().await.clone()
    }
}

#[async_trait]
impl TokenRefresher for MockTokenRefresher {
    async fn refresh(&self, _session: &Session, account: &Account) -> CoreResult<()> {
        self.refreshed.write().await.push(account.id.clone());
        Ok(())
    }
}

// ===== MockAuthenticationFlow =====

pub enum FlowBehavior {
    Complete(AuthorizedProfile),
    Fail(CoreError),
    /// Never completes, as if the user walked away from the login window
    Hang,
}

pub struct MockAuthenticationFlow {
    behavior: FlowBehavior,
    authorize_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

impl MockAuthenticationFlow {
    pub fn new(behavior: FlowBehavior) -> Self {
        Self {
            behavior,
            authorize_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
        }
    }

    pub fn completing(username: &str) -> Self {
        Self::new(FlowBehavior::Complete(AuthorizedProfile {
            username: username.to_string(),
            metadata: AccountMetadata {
                follower_count: 1200,
                following_count: 300,
                post_count: 48,
                profile_picture_url: None,
            },
        }))
    }

    pub fn authorize_count(&self) -> usize {
        self.authorize_calls.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthenticationFlow for MockAuthenticationFlow {
    async fn authorize(&self, _platform: Platform) -> CoreResult<AuthorizedProfile> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            FlowBehavior::Complete(profile) => Ok(profile.clone()),
            FlowBehavior::Fail(err) => Err(err.clone()),
            FlowBehavior::Hang => std::future::pending().await,
        }
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ===== Factory method =====

pub fn test_session() -> Session {
    Session::new("user-1")
}

/// A provisional account with a fixed id
pub fn local_account(id: &str, platform: Platform, username: &str) -> Account {
    let mut account = Account::new_local(platform, username.to_string(), AccountMetadata::default());
    account.id = id.to_string();
    account
}

/// Create test `ServiceContext`
pub fn create_test_context() -> (
    Arc<ServiceContext>,
    Arc<MockLocalStore>,
    Arc<MockRemoteAccountRepository>,
) {
    let local_store = Arc::new(MockLocalStore::new());
    let remote_repo = Arc::new(MockRemoteAccountRepository::new());
    let ctx = Arc::new(ServiceContext::new(
        local_store.clone(),
        remote_repo.clone(),
        ReconcileConfig::default(),
    ));
    (ctx, local_store, remote_repo)
}

/// Create test `ReconciliationService`
pub fn create_test_reconciliation_service() -> (
    ReconciliationService,
    Arc<MockLocalStore>,
    Arc<MockRemoteAccountRepository>,
) {
    let (ctx, local_store, remote_repo) = create_test_context();
    (ReconciliationService::new(ctx), local_store, remote_repo)
}

/// Create test `ReconciliationService` with a token refresher attached
pub fn create_test_reconciliation_service_with_refresher(
    refresher: Arc<MockTokenRefresher>,
) -> (
    ReconciliationService,
    Arc<MockLocalStore>,
    Arc<MockRemoteAccountRepository>,
) {
    let local_store = Arc::new(MockLocalStore::new());
    let remote_repo = Arc::new(MockRemoteAccountRepository::new());
    let ctx = ServiceContext::new(
        local_store.clone(),
        remote_repo.clone(),
        ReconcileConfig::default(),
    )
    .with_token_refresher(refresher);
    (
        ReconciliationService::new(Arc::new(ctx)),
        local_store,
        remote_repo,
    )
}
