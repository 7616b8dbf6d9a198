//! `SeaORM` entities for `SqliteStore`.

pub mod connected_account;
