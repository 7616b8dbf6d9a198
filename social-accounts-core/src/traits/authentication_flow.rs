//! Interactive authentication flow abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{AuthorizedProfile, Platform};

/// Authentication Flow Trait
///
/// An external, user-driven step (OAuth popup, login window, ...) that yields the
/// profile to connect. The caller bounds `authorize` with a timeout and calls
/// `close` once it stops waiting, whatever the outcome.
#[async_trait]
pub trait AuthenticationFlow: Send + Sync {
    /// Open the secondary surface and wait for the user to finish
    async fn authorize(&self, platform: Platform) -> CoreResult<AuthorizedProfile>;

    /// Close the secondary surface if it is still open
    async fn close(&self);
}
