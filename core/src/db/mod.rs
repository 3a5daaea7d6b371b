//! SQLite connection bootstrap and schema migrations.
//!
//! # Design
//! Every connection handed to the store has `foreign_keys=ON` and a fully
//! migrated schema. The schema version lives in `PRAGMA user_version`.

use thiserror::Error;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
