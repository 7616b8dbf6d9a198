//! Type definition module

mod account;
mod platform;
mod session;
mod sync;

pub use account::{
    is_local_id, new_local_id, normalize_username, username_key, Account, AccountMetadata,
    AccountStats, ConnectAccountRequest, NewRemoteAccount, LOCAL_ID_PREFIX,
};
pub use platform::Platform;
pub use session::{AuthorizedProfile, Session, SessionEvent};
pub use sync::{SyncFailure, SyncReport};
