//! Remote account table abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Account, AccountStats, NewRemoteAccount, Platform};

/// Remote account table Trait
///
/// Every call is scoped by `user_id`; the backing store is expected to enforce that
/// scoping itself. Transport or storage failures map to `CoreError::Connection`.
///
/// Platform implementation:
/// - `SqliteStore` (`SeaORM`, app crate)
#[async_trait]
pub trait RemoteAccountRepository: Send + Sync {
    /// Get all accounts of a user
    ///
    /// Ordered by creation time, then id.
    async fn find_by_user(&self, user_id: &str) -> CoreResult<Vec<Account>>;

    /// Get account based on ID
    ///
    /// # Arguments
    /// * `user_id` - Owner
    /// * `id` - Remote account ID
    async fn find_by_id(&self, user_id: &str, id: &str) -> CoreResult<Option<Account>>;

    /// Find the active account for a platform/username pair
    ///
    /// # Arguments
    /// * `user_id` - Owner
    /// * `platform` - Platform
    /// * `username_key` - Lowercase username, compared case-insensitively
    async fn find_active(
        &self,
        user_id: &str,
        platform: Platform,
        username_key: &str,
    ) -> CoreResult<Option<Account>>;

    /// Insert a new account and return it with its server-assigned ID
    ///
    /// # Arguments
    /// * `user_id` - Owner
    /// * `account` - Validated account data
    async fn insert(&self, user_id: &str, account: NewRemoteAccount) -> CoreResult<Account>;

    /// Delete account
    ///
    /// Deleting an ID that does not exist is not an error.
    ///
    /// # Arguments
    /// * `user_id` - Owner
    /// * `id` - Remote account ID
    async fn delete(&self, user_id: &str, id: &str) -> CoreResult<()>;

    /// Overwrite advisory counters
    ///
    /// Returns the updated account, or `None` when the ID does not exist.
    async fn update_stats(
        &self,
        user_id: &str,
        id: &str,
        stats: &AccountStats,
    ) -> CoreResult<Option<Account>>;
}
