//! Account related type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

use super::Platform;

/// Prefix marking ids generated on the client before remote confirmation.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Connected social account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account ID, either `local_*` (provisional) or server assigned
    pub id: String,
    /// Social platform
    pub platform: Platform,
    /// Display handle
    pub username: String,
    /// Inactive accounts are disconnected but kept for history
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub post_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    /// Connection time
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
}

const fn default_active() -> bool {
    true
}

impl Account {
    /// Builds a provisional account with a fresh local id.
    #[must_use]
    pub fn new_local(platform: Platform, username: String, metadata: AccountMetadata) -> Self {
        Self {
            id: new_local_id(),
            platform,
            username,
            is_active: true,
            follower_count: metadata.follower_count,
            following_count: metadata.following_count,
            post_count: metadata.post_count,
            profile_picture_url: metadata.profile_picture_url,
            created_at: Utc::now(),
        }
    }

    /// Whether this record lives in the local (provisional) namespace.
    #[must_use]
    pub fn is_local(&self) -> bool {
        is_local_id(&self.id)
    }

    /// Key used for deduplication: platform plus lowercase username.
    #[must_use]
    pub fn dedup_key(&self) -> (Platform, String) {
        (self.platform, username_key(&self.username))
    }

    /// Display metadata carried by this account.
    #[must_use]
    pub fn metadata(&self) -> AccountMetadata {
        AccountMetadata {
            follower_count: self.follower_count,
            following_count: self.following_count,
            post_count: self.post_count,
            profile_picture_url: self.profile_picture_url.clone(),
        }
    }

    /// Overwrites the advisory counters with fresh values.
    pub fn apply_stats(&mut self, stats: &AccountStats) {
        self.follower_count = stats.follower_count;
        self.following_count = stats.following_count;
        self.post_count = stats.post_count;
        if let Some(ref url) = stats.profile_picture_url {
            self.profile_picture_url = Some(url.clone());
        }
    }
}

/// Whether `id` belongs to the local namespace.
#[must_use]
pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

/// Generates a new local id.
#[must_use]
pub fn new_local_id() -> String {
    format!("{LOCAL_ID_PREFIX}{}", uuid::Uuid::new_v4().simple())
}

/// Lowercase comparison key for a username.
#[must_use]
pub fn username_key(username: &str) -> String {
    username.trim().trim_start_matches('@').to_lowercase()
}

/// Trims surrounding whitespace and a leading `@`, rejecting empty handles.
pub fn normalize_username(raw: &str) -> CoreResult<String> {
    let username = raw.trim().trim_start_matches('@').trim();
    if username.is_empty() {
        return Err(CoreError::Validation("username is required".to_string()));
    }
    Ok(username.to_string())
}

/// Display metadata supplied when connecting an account
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountMetadata {
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub post_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

/// Fresh counters fetched for an existing account
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    pub follower_count: u64,
    pub following_count: u64,
    pub post_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

/// Connect account request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAccountRequest {
    /// Raw platform name, normalized on connect
    pub platform: String,
    /// Raw username, normalized on connect
    pub username: String,
    #[serde(default)]
    pub metadata: AccountMetadata,
}

impl ConnectAccountRequest {
    #[must_use]
    pub fn new(platform: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            username: username.into(),
            metadata: AccountMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: AccountMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Validated input for a remote insert.
///
/// The repository assigns the id; `created_at` is carried over so a migrated
/// record keeps its original connection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRemoteAccount {
    pub platform: Platform,
    pub username: String,
    pub metadata: AccountMetadata,
    pub created_at: DateTime<Utc>,
}

impl NewRemoteAccount {
    /// Materializes the record with the id assigned by remote storage.
    #[must_use]
    pub fn into_account(self, id: String) -> Account {
        Account {
            id,
            platform: self.platform,
            username: self.username,
            is_active: true,
            follower_count: self.metadata.follower_count,
            following_count: self.metadata.following_count,
            post_count: self.metadata.post_count,
            profile_picture_url: self.metadata.profile_picture_url,
            created_at: self.created_at,
        }
    }
}
