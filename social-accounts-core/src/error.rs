//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

use crate::types::Platform;

/// Core layer error type
#[derive(Error, Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// The operation needs a signed-in session and there is none
    #[error("Authentication required")]
    AuthRequired,

    /// An active account for the same platform and username already exists remotely
    #[error("Duplicate account: {platform}/{username}")]
    DuplicateAccount { platform: Platform, username: String },

    /// Remote storage could not be reached or rejected the request
    #[error("Connection error: {0}")]
    Connection(String),

    /// An interactive step did not complete in time
    #[error("Timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Missing or malformed platform/username input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Local cache could not be read or written
    #[error("Local cache error: {0}")]
    LocalCache(String),

    /// External authentication flow failed or was cancelled
    #[error("Authentication flow failed: {0}")]
    AuthFlow(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Whether it is expected behavior (user input, duplicates, missing session, etc.),
    /// used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::AuthRequired
                | Self::DuplicateAccount { .. }
                | Self::Validation(_)
                | Self::AccountNotFound(_)
                | Self::Timeout { .. }
        )
    }

    /// Whether the caller may retry the same operation unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout { .. } | Self::LocalCache(_) | Self::AuthFlow(_)
        )
    }

    /// Human-readable message for the end user, one per error kind.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Please sign in to manage this account.".to_string(),
            Self::DuplicateAccount { platform, username } => format!(
                "Your {} account @{username} is already connected. Disconnect it first to connect it again.",
                platform.display_name()
            ),
            Self::Connection(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Self::Timeout { .. } => {
                "The connection took too long to complete. Please try again.".to_string()
            }
            Self::Validation(msg) => format!("Invalid input: {msg}"),
            Self::AccountNotFound(_) => "That account is no longer connected.".to_string(),
            Self::LocalCache(_) => {
                "Could not update saved accounts on this device. Please try again.".to_string()
            }
            Self::AuthFlow(_) => "Sign-in with the platform did not finish. Please try again."
                .to_string(),
            Self::Serialization(_) => "Something went wrong while saving your accounts.".to_string(),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
