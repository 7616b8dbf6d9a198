//! `RemoteAccountRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, SqlErr,
};

use social_accounts_core::error::{CoreError, CoreResult};
use social_accounts_core::traits::RemoteAccountRepository;
use social_accounts_core::types::{
    username_key, Account, AccountStats, NewRemoteAccount, Platform,
};

use super::entity::connected_account;
use super::SqliteStore;

impl connected_account::Model {
    /// Convert a `SeaORM` row model into a domain `Account`.
    fn into_account(self) -> CoreResult<Account> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| CoreError::Serialization(format!("Invalid created_at: {e}")))?
            .with_timezone(&Utc);
        let platform: Platform = self
            .platform
            .parse()
            .map_err(|e| CoreError::Serialization(format!("Invalid platform: {e}")))?;

        Ok(Account {
            id: self.id,
            platform,
            username: self.username,
            is_active: self.is_active,
            follower_count: count_from_db(self.follower_count),
            following_count: count_from_db(self.following_count),
            post_count: count_from_db(self.post_count),
            profile_picture_url: self.profile_picture_url,
            created_at,
        })
    }
}

/// Fixed-width timestamps keep lexical order equal to chronological order.
fn timestamp_to_db(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn count_to_db(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn count_from_db(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

fn db_error(action: &str, e: &sea_orm::DbErr) -> CoreError {
    CoreError::Connection(format!("Failed to {action}: {e}"))
}

#[async_trait]
impl RemoteAccountRepository for SqliteStore {
    async fn find_by_user(&self, user_id: &str) -> CoreResult<Vec<Account>> {
        let rows = connected_account::Entity::find()
            .filter(connected_account::Column::UserId.eq(user_id))
            .order_by_asc(connected_account::Column::CreatedAt)
            .order_by_asc(connected_account::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("query accounts", &e))?;

        rows.into_iter()
            .map(connected_account::Model::into_account)
            .collect()
    }

    async fn find_by_id(&self, user_id: &str, id: &str) -> CoreResult<Option<Account>> {
        let row = connected_account::Entity::find_by_id(id)
            .filter(connected_account::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| db_error("query account", &e))?;

        row.map(connected_account::Model::into_account).transpose()
    }

    async fn find_active(
        &self,
        user_id: &str,
        platform: Platform,
        username_key: &str,
    ) -> CoreResult<Option<Account>> {
        let row = connected_account::Entity::find()
            .filter(connected_account::Column::UserId.eq(user_id))
            .filter(connected_account::Column::Platform.eq(platform.as_str()))
            .filter(connected_account::Column::UsernameKey.eq(username_key))
            .filter(connected_account::Column::IsActive.eq(true))
            .order_by_asc(connected_account::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(|e| db_error("query account", &e))?;

        row.map(connected_account::Model::into_account).transpose()
    }

    async fn insert(&self, user_id: &str, account: NewRemoteAccount) -> CoreResult<Account> {
        let id = uuid::Uuid::new_v4().to_string();
        let active_model = connected_account::ActiveModel {
            id: Set(id.clone()),
            user_id: Set(user_id.to_string()),
            platform: Set(account.platform.as_str().to_string()),
            username: Set(account.username.clone()),
            username_key: Set(username_key(&account.username)),
            is_active: Set(true),
            follower_count: Set(count_to_db(account.metadata.follower_count)),
            following_count: Set(count_to_db(account.metadata.following_count)),
            post_count: Set(count_to_db(account.metadata.post_count)),
            profile_picture_url: Set(account.metadata.profile_picture_url.clone()),
            created_at: Set(timestamp_to_db(&account.created_at)),
        };

        connected_account::Entity::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => CoreError::DuplicateAccount {
                    platform: account.platform,
                    username: account.username.clone(),
                },
                _ => db_error("insert account", &e),
            })?;

        Ok(account.into_account(id))
    }

    async fn delete(&self, user_id: &str, id: &str) -> CoreResult<()> {
        let result = connected_account::Entity::delete_many()
            .filter(connected_account::Column::UserId.eq(user_id))
            .filter(connected_account::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("delete account", &e))?;

        if result.rows_affected == 0 {
            log::debug!("Remote account {id} was already absent");
        }
        Ok(())
    }

    async fn update_stats(
        &self,
        user_id: &str,
        id: &str,
        stats: &AccountStats,
    ) -> CoreResult<Option<Account>> {
        let model = connected_account::Entity::find_by_id(id)
            .filter(connected_account::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| db_error("query account", &e))?;

        let Some(model) = model else {
            return Ok(None);
        };

        let mut active: connected_account::ActiveModel = model.into();
        active.follower_count = Set(count_to_db(stats.follower_count));
        active.following_count = Set(count_to_db(stats.following_count));
        active.post_count = Set(count_to_db(stats.post_count));
        if let Some(url) = &stats.profile_picture_url {
            active.profile_picture_url = Set(Some(url.clone()));
        }

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| db_error("update stats", &e))?;

        updated.into_account().map(Some)
    }
}
