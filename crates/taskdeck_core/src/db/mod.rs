//! SQLite storage for projects, tasks, checklist items and comments.
//!
//! # Schema
//! - `projects` 1─* `tasks` 1─* `checklist_items` / `comments`, all keyed by
//!   UUID text and stamped with epoch-ms `created_at` (`updated_at` on every
//!   table but `comments`).
//! - Every child key is a declared foreign key with `ON DELETE CASCADE`;
//!   connections from this module always run with `foreign_keys = ON`, so a
//!   raw parent delete can never leave orphans.
//! - CHECK rules keep text non-blank, `priority` in `low|medium|high`,
//!   `time_spent >= 0` and flags in `0|1`.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`; a newer file is refused.
//! - Repositories only accept connections at the latest version.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, BUSY_TIMEOUT};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating a task database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File was written by a newer taskdeck build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "taskdeck database schema version {db_version} is newer than supported {latest_supported}"
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
