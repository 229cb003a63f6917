//! SQLite bootstrap for the `persons` table.
//!
//! # Responsibility
//! - Open the in-memory connection that holds every person row; nothing is
//!   written to disk and the rows vanish with the connection.
//! - Create `persons` (five `TEXT NOT NULL` columns in wire order) and its
//!   id/email lookup indexes through numbered migrations.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - A connection whose version is newer than this build knows is refused
//!   instead of being read with a mismatched column layout.
//! - No person row is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::open_db_in_memory;

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the people database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// `user_version` is ahead of the last migration shipped in `migrations`.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "people schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
