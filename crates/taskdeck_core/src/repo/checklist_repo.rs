//! Checklist store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own `checklist_items` rows keyed by their task.
//! - Expose connection-level helpers so the task repository can create,
//!   update and delete items inside its own transaction.
//!
//! # Invariants
//! - Items are listed in ascending creation order, ties broken by insertion
//!   order (`rowid`).
//! - Item ids are always generated here; caller ids are never persisted.
//! - `task_id` is fixed at creation.

use crate::model::checklist::{ChecklistItem, ChecklistItemId, ChecklistItemPatch};
use crate::model::task::TaskId;
use crate::model::validation::{require_text, ValidationError};
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_flag, parse_uuid, task_exists, EntityKind,
    RepoError, RepoResult, NOW_MS_SQL,
};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    task_id,
    text,
    completed,
    created_at,
    updated_at
FROM checklist_items";

/// Repository interface for checklist items.
pub trait ChecklistRepository {
    /// Creates one item bound to an existing task.
    fn create_item(&self, task_id: TaskId, text: &str, completed: bool)
        -> RepoResult<ChecklistItem>;
    fn get_item(&self, id: ChecklistItemId) -> RepoResult<Option<ChecklistItem>>;
    /// Lists items of one task in creation order.
    fn list_items(&self, task_id: TaskId) -> RepoResult<Vec<ChecklistItem>>;
    /// Applies a text/completed overlay to one item.
    fn update_item(&self, id: ChecklistItemId, patch: &ChecklistItemPatch) -> RepoResult<()>;
    fn delete_item(&self, id: ChecklistItemId) -> RepoResult<()>;
}

/// SQLite-backed checklist store.
pub struct SqliteChecklistRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChecklistRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ChecklistRepository for SqliteChecklistRepository<'_> {
    fn create_item(
        &self,
        task_id: TaskId,
        text: &str,
        completed: bool,
    ) -> RepoResult<ChecklistItem> {
        require_text(text, ValidationError::EmptyChecklistText)?;
        if !task_exists(self.conn, task_id)? {
            return Err(RepoError::NotFound {
                entity: EntityKind::Task,
                id: task_id,
            });
        }

        let id = insert_item(self.conn, task_id, text, completed)?;
        load_item(self.conn, id)?.ok_or(RepoError::NotFound {
            entity: EntityKind::ChecklistItem,
            id,
        })
    }

    fn get_item(&self, id: ChecklistItemId) -> RepoResult<Option<ChecklistItem>> {
        load_item(self.conn, id)
    }

    fn list_items(&self, task_id: TaskId) -> RepoResult<Vec<ChecklistItem>> {
        list_items_for_task(self.conn, task_id)
    }

    fn update_item(&self, id: ChecklistItemId, patch: &ChecklistItemPatch) -> RepoResult<()> {
        patch.validate()?;
        let changed = update_item_fields(self.conn, id, patch.text.as_deref(), patch.completed)?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::ChecklistItem,
                id,
            });
        }
        Ok(())
    }

    fn delete_item(&self, id: ChecklistItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM checklist_items WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::ChecklistItem,
                id,
            });
        }
        Ok(())
    }
}

/// Inserts one item with a freshly generated id.
pub(crate) fn insert_item(
    conn: &Connection,
    task_id: TaskId,
    text: &str,
    completed: bool,
) -> RepoResult<ChecklistItemId> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO checklist_items (id, task_id, text, completed)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            id.to_string(),
            task_id.to_string(),
            text.trim(),
            bool_to_int(completed),
        ],
    )?;
    Ok(id)
}

/// Overlays text/completed on one item; returns the number of rows touched.
pub(crate) fn update_item_fields(
    conn: &Connection,
    id: ChecklistItemId,
    text: Option<&str>,
    completed: Option<bool>,
) -> RepoResult<usize> {
    let changed = conn.execute(
        &format!(
            "UPDATE checklist_items
             SET
                text = COALESCE(?2, text),
                completed = COALESCE(?3, completed),
                updated_at = {NOW_MS_SQL}
             WHERE id = ?1;"
        ),
        params![
            id.to_string(),
            text.map(str::trim),
            completed.map(bool_to_int),
        ],
    )?;
    Ok(changed)
}

pub(crate) fn delete_item_row(conn: &Connection, id: ChecklistItemId) -> RepoResult<usize> {
    Ok(conn.execute("DELETE FROM checklist_items WHERE id = ?1;", [id.to_string()])?)
}

pub(crate) fn load_item(
    conn: &Connection,
    id: ChecklistItemId,
) -> RepoResult<Option<ChecklistItem>> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_item_row(row)?));
    }
    Ok(None)
}

pub(crate) fn list_items_for_task(
    conn: &Connection,
    task_id: TaskId,
) -> RepoResult<Vec<ChecklistItem>> {
    let mut stmt = conn.prepare(&format!(
        "{ITEM_SELECT_SQL}
         WHERE task_id = ?1
         ORDER BY created_at ASC, rowid ASC;"
    ))?;
    let mut rows = stmt.query([task_id.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_item_row(row)?);
    }
    Ok(items)
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ChecklistItem> {
    let id_text: String = row.get("id")?;
    let task_id_text: String = row.get("task_id")?;
    Ok(ChecklistItem {
        id: parse_uuid(&id_text, "checklist_items.id")?,
        task_id: parse_uuid(&task_id_text, "checklist_items.task_id")?,
        text: row.get("text")?,
        completed: parse_flag(row.get("completed")?, "checklist_items.completed")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
