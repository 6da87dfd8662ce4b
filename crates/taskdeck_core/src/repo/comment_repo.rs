//! Comment store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own `comments` rows keyed by their task.
//! - Provide connection-level insert/list helpers for task aggregate writes.
//!
//! # Invariants
//! - Comments have no update timestamp; only `text` may change.
//! - `task_id` is fixed at creation.

use crate::model::comment::{Comment, CommentId};
use crate::model::task::TaskId;
use crate::model::validation::{require_text, ValidationError};
use crate::repo::{
    ensure_connection_ready, parse_uuid, task_exists, EntityKind, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const COMMENT_SELECT_SQL: &str = "SELECT id, task_id, text, created_at FROM comments";

/// Listing order for comments of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommentOrder {
    /// Conversation order, used when a task is loaded with its children.
    OldestFirst,
    /// Feed order, used by the standalone comment listing.
    NewestFirst,
}

/// Repository interface for task comments.
pub trait CommentRepository {
    /// Creates one comment bound to an existing task.
    fn create_comment(&self, task_id: TaskId, text: &str) -> RepoResult<Comment>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    /// Lists comments of one task, newest first.
    fn list_comments(&self, task_id: TaskId) -> RepoResult<Vec<Comment>>;
    /// Replaces comment text.
    fn update_comment(&self, id: CommentId, text: &str) -> RepoResult<()>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<()>;
}

/// SQLite-backed comment store.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn create_comment(&self, task_id: TaskId, text: &str) -> RepoResult<Comment> {
        require_text(text, ValidationError::EmptyCommentText)?;
        if !task_exists(self.conn, task_id)? {
            return Err(RepoError::NotFound {
                entity: EntityKind::Task,
                id: task_id,
            });
        }

        let id = insert_comment(self.conn, task_id, text)?;
        load_comment(self.conn, id)?.ok_or(RepoError::NotFound {
            entity: EntityKind::Comment,
            id,
        })
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        load_comment(self.conn, id)
    }

    fn list_comments(&self, task_id: TaskId) -> RepoResult<Vec<Comment>> {
        list_comments_for_task(self.conn, task_id, CommentOrder::NewestFirst)
    }

    fn update_comment(&self, id: CommentId, text: &str) -> RepoResult<()> {
        require_text(text, ValidationError::EmptyCommentText)?;
        let changed = self.conn.execute(
            "UPDATE comments SET text = ?2 WHERE id = ?1;",
            params![id.to_string(), text.trim()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Comment,
                id,
            });
        }
        Ok(())
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Comment,
                id,
            });
        }
        Ok(())
    }
}

/// Inserts one comment with a freshly generated id.
pub(crate) fn insert_comment(conn: &Connection, task_id: TaskId, text: &str) -> RepoResult<CommentId> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO comments (id, task_id, text) VALUES (?1, ?2, ?3);",
        params![id.to_string(), task_id.to_string(), text.trim()],
    )?;
    Ok(id)
}

pub(crate) fn load_comment(conn: &Connection, id: CommentId) -> RepoResult<Option<Comment>> {
    let mut stmt = conn.prepare(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_comment_row(row)?));
    }
    Ok(None)
}

pub(crate) fn list_comments_for_task(
    conn: &Connection,
    task_id: TaskId,
    order: CommentOrder,
) -> RepoResult<Vec<Comment>> {
    let order_by = match order {
        CommentOrder::OldestFirst => "created_at ASC, rowid ASC",
        CommentOrder::NewestFirst => "created_at DESC, rowid DESC",
    };
    let mut stmt = conn.prepare(&format!(
        "{COMMENT_SELECT_SQL} WHERE task_id = ?1 ORDER BY {order_by};"
    ))?;
    let mut rows = stmt.query([task_id.to_string()])?;
    let mut comments = Vec::new();
    while let Some(row) = rows.next()? {
        comments.push(parse_comment_row(row)?);
    }
    Ok(comments)
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let id_text: String = row.get("id")?;
    let task_id_text: String = row.get("task_id")?;
    Ok(Comment {
        id: parse_uuid(&id_text, "comments.id")?,
        task_id: parse_uuid(&task_id_text, "comments.task_id")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
    })
}
