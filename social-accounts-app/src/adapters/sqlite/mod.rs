//! SQLite-backed remote account table using `SeaORM`.
//!
//! `SqliteStore` implements `RemoteAccountRepository` against a local `SQLite`
//! database, for hosts that keep the account table on the same machine (CLI,
//! desktop, integration tests).

mod account_repo;
pub(crate) mod entity;
mod migration;

use std::path::Path;

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use social_accounts_core::error::{CoreError, CoreResult};

use migration::Migrator;

/// SQLite-based remote account table.
///
/// Rows are scoped by `user_id` in every query, so one database can serve
/// several signed-in users.
pub struct SqliteStore {
    /// Shared `SeaORM` database connection.
    pub(crate) db: DatabaseConnection,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and bring its schema up to date.
    ///
    /// # Errors
    /// Returns `CoreError::Connection` if directory creation, database
    /// connection, or schema migration fails.
    pub async fn new(db_path: &Path) -> CoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::Connection(format!("Failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = Database::connect(&db_url)
            .await
            .map_err(|e| CoreError::Connection(format!("Failed to connect to SQLite: {e}")))?;

        let store = Self { db };

        Migrator::up(&store.db, None)
            .await
            .map_err(|e| CoreError::Connection(format!("Failed to run migrations: {e}")))?;

        Ok(store)
    }
}
