//! Storage and host collaborator abstraction trait definitions

mod auth_session;
mod authentication_flow;
mod local_store;
mod notification_sink;
mod remote_account_repository;
mod token_refresher;

pub use auth_session::{AuthSessionProvider, InMemorySessionProvider};
pub use authentication_flow::AuthenticationFlow;
pub use local_store::{InMemoryLocalStore, LocalStore};
pub use notification_sink::{NoopNotificationSink, NotificationSink};
pub use remote_account_repository::RemoteAccountRepository;
pub use token_refresher::TokenRefresher;
