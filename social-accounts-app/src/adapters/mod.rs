//! Storage adapters for hosts without a browser-provided local store or remote backend.

mod json_file_store;

pub use json_file_store::JsonFileLocalStore;

#[cfg(feature = "sqlite-store")]
mod sqlite;

#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteStore;
