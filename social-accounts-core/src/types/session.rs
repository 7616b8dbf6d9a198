//! Session related type definitions

use serde::{Deserialize, Serialize};

/// Authenticated user session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// User ID that scopes remote storage
    pub user_id: String,
}

impl Session {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Session transition published by the auth provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(Session),
    LoggedOut,
}

/// Profile returned by a completed interactive authentication flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedProfile {
    pub username: String,
    #[serde(default)]
    pub metadata: super::AccountMetadata,
}
