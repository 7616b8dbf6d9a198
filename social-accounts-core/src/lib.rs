//! Social Accounts Core Library
//!
//! Keeps the set of connected social-media accounts for a user consistent across
//! two sources of truth:
//! - a local cache (used before sign-in or as an offline staging area)
//! - a remote, user-scoped account table
//!
//! Storage and host collaborators are abstracted through traits, so the same
//! reconciliation logic runs against a browser store, a file, or a database.

pub mod config;
pub mod error;
pub mod local_cache;
pub mod notification;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::ReconcileConfig;
pub use error::{CoreError, CoreResult};
pub use local_cache::LocalAccountCache;
pub use notification::{Notification, NotificationKind};
pub use services::{ConnectFlowService, ReconciliationService, ServiceContext};
pub use traits::{
    AuthSessionProvider, AuthenticationFlow, LocalStore, NotificationSink,
    RemoteAccountRepository, TokenRefresher,
};
pub use types::{Account, Platform, Session, SyncReport};
