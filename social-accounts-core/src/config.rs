//! Reconciliation configuration
//!
//! Every field has a default, so an empty TOML document is a valid configuration:
//!
//! ```toml
//! cache_key = "social_accounts"
//! connect_timeout_secs = 60
//! cache_update_retries = 8
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Key of the local blob holding provisional accounts.
pub const DEFAULT_CACHE_KEY: &str = "social_accounts";

/// Upper bound for interactive connection flows.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 60;

/// Compare-and-set attempts before a local cache update gives up.
pub const DEFAULT_CACHE_UPDATE_RETRIES: u32 = 8;

/// Reconciliation settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Local store key of the account blob
    pub cache_key: String,
    /// Bounded wait for `AuthenticationFlow::authorize`
    pub connect_timeout_secs: u64,
    /// Compare-and-set attempts per local cache mutation
    pub cache_update_retries: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            cache_update_retries: DEFAULT_CACHE_UPDATE_RETRIES,
        }
    }
}

impl ReconcileConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| CoreError::Validation(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would disable the cache or the timeout.
    pub fn validate(&self) -> CoreResult<()> {
        if self.cache_key.trim().is_empty() {
            return Err(CoreError::Validation(
                "cache_key must not be empty".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(CoreError::Validation(
                "connect_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.cache_update_retries == 0 {
            return Err(CoreError::Validation(
                "cache_update_retries must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ReconcileConfig::from_toml_str("").unwrap();
        assert_eq!(config, ReconcileConfig::default());
        assert_eq!(config.connect_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn overrides_are_applied() {
        let config = ReconcileConfig::from_toml_str(
            "cache_key = \"accounts_v2\"\nconnect_timeout_secs = 30\n",
        )
        .unwrap();
        assert_eq!(config.cache_key, "accounts_v2");
        assert_eq!(config.connect_timeout_secs, 30);
        assert_eq!(config.cache_update_retries, DEFAULT_CACHE_UPDATE_RETRIES);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = ReconcileConfig::from_toml_str("connect_timeout_secs = 0");
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = ReconcileConfig::from_toml_str("cache_ttl = 5");
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
