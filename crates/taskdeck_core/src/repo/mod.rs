//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per store.
//! - Isolate SQLite query details from service orchestration.
//! - Run every multi-statement write as one immediate transaction.
//!
//! # Invariants
//! - Write paths validate their input before any SQL mutation.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `ConstraintViolation`) instead of raw SQLite failures.
//! - Children are deleted before parents, inside the parent's transaction.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod checklist_repo;
pub mod comment_repo;
pub mod project_repo;
pub mod task_repo;

/// SQL expression for the current time in epoch milliseconds.
pub(crate) const NOW_MS_SQL: &str = "(strftime('%s', 'now') * 1000)";

const REQUIRED_TABLES: [&str; 4] = ["projects", "tasks", "checklist_items", "comments"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Record family a repository error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Task,
    ChecklistItem,
    Comment,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Project => "project",
            Self::Task => "task",
            Self::ChecklistItem => "checklist item",
            Self::Comment => "comment",
        };
        f.write_str(name)
    }
}

/// Repository error shared by every store.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected before any write.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target record does not exist.
    NotFound { entity: EntityKind, id: Uuid },
    /// Storage refused the write (foreign key, check or uniqueness rule).
    ConstraintViolation(String),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::ConstraintViolation(message) => {
                write!(f, "storage constraint violated: {message}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, message) = &value {
            if err.code == ErrorCode::ConstraintViolation {
                return Self::ConstraintViolation(
                    message.clone().unwrap_or_else(|| err.to_string()),
                );
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rows removed by one cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub projects: usize,
    pub tasks: usize,
    pub checklist_items: usize,
    pub comments: usize,
}

/// Starts a write transaction that takes the database write lock up front.
///
/// Dropping the returned transaction without `commit` rolls it back.
pub(crate) fn immediate_tx(conn: &Connection) -> RepoResult<Transaction<'_>> {
    Ok(Transaction::new_unchecked(
        conn,
        TransactionBehavior::Immediate,
    )?)
}

/// Starts a deferred transaction for multi-statement reads.
///
/// Every statement run through it sees one snapshot; a writer committing
/// between two of them cannot produce a mixed result.
pub(crate) fn read_tx(conn: &Connection) -> RepoResult<Transaction<'_>> {
    Ok(Transaction::new_unchecked(
        conn,
        TransactionBehavior::Deferred,
    )?)
}

pub(crate) fn project_exists(conn: &Connection, id: Uuid) -> RepoResult<bool> {
    row_exists(conn, "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1);", id)
}

pub(crate) fn task_exists(conn: &Connection, id: Uuid) -> RepoResult<bool> {
    row_exists(conn, "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1);", id)
}

fn row_exists(conn: &Connection, sql: &str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, [id.to_string()], |row| row.get(0))?;
    Ok(exists == 1)
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_flag(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

/// Rejects connections that were not opened through [`crate::db`].
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}
