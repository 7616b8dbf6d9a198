//! Token refresh abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Account, Session};

/// Token Refresher Trait
///
/// Refreshing platform tokens is owned by the host; the library only routes the
/// request for a confirmed remote account.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Refresh the platform token held for `account`
    async fn refresh(&self, session: &Session, account: &Account) -> CoreResult<()>;
}
