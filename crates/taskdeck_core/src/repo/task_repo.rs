//! Task aggregate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist tasks together with their checklist items and comments.
//! - Reconcile a task's checklist against a desired end state.
//! - Provide race-free time tracking writes.
//!
//! # Invariants
//! - Aggregate creation and update each run in one immediate transaction;
//!   any failure rolls back every row written by that call.
//! - `update_time` is a single conditional `UPDATE`, so concurrent pings
//!   converge on the largest value regardless of arrival order.
//! - Task deletion removes checklist items and comments before the task row,
//!   inside the same transaction.
//! - Task listings are ordered newest created first.
//! - A task and its children are read inside one transaction, so an
//!   aggregate never mixes rows from before and after a concurrent write.

use crate::model::checklist::{ChecklistItemId, ChecklistItemInput};
use crate::model::comment::CommentInput;
use crate::model::project::ProjectId;
use crate::model::task::{NewTask, Priority, Task, TaskAggregate, TaskId, TaskPatch};
use crate::model::validation::{require_non_negative, ValidationError};
use crate::repo::checklist_repo::{
    delete_item_row, insert_item, list_items_for_task, update_item_fields,
};
use crate::repo::comment_repo::{insert_comment, list_comments_for_task, CommentOrder};
use crate::repo::{
    bool_to_int, ensure_connection_ready, immediate_tx, parse_flag, parse_uuid, project_exists,
    read_tx, task_exists, CascadeSummary, EntityKind, RepoError, RepoResult, NOW_MS_SQL,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashSet;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    title,
    description,
    completed,
    deadline,
    deadline_time,
    priority,
    time_spent,
    timer_active,
    created_at,
    updated_at
FROM tasks";

/// Query options for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    /// Restricts the listing to one project.
    pub project_id: Option<ProjectId>,
}

/// Outcome of one checklist reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecklistSync {
    pub updated: usize,
    pub created: usize,
    pub deleted: usize,
}

/// Repository interface for the task aggregate.
pub trait TaskRepository {
    /// Inserts a task and its initial children as one unit.
    fn create_task(
        &self,
        task: &NewTask,
        checklist: &[ChecklistItemInput],
        comments: &[CommentInput],
    ) -> RepoResult<TaskId>;
    /// Loads one task without children.
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Loads one task with its checklist and comments.
    fn get_task_aggregate(&self, id: TaskId) -> RepoResult<Option<TaskAggregate>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn list_task_aggregates(&self, query: &TaskListQuery) -> RepoResult<Vec<TaskAggregate>>;
    /// Overlays `patch` and, when `checklist` is supplied, syncs the task's
    /// checklist to it. Both happen in one transaction.
    fn update_task(
        &self,
        id: TaskId,
        patch: &TaskPatch,
        checklist: Option<&[ChecklistItemInput]>,
    ) -> RepoResult<ChecklistSync>;
    /// Raises `time_spent` to `time_spent` if larger. Returns whether it moved.
    fn update_time(&self, id: TaskId, time_spent: i64) -> RepoResult<bool>;
    /// Overwrites `time_spent` and `timer_active` unconditionally.
    fn update_timer(&self, id: TaskId, time_spent: i64, timer_active: bool) -> RepoResult<()>;
    /// Deletes a task with its checklist items and comments.
    fn delete_task(&self, id: TaskId) -> RepoResult<CascadeSummary>;
}

/// SQLite-backed task aggregate repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(
        &self,
        task: &NewTask,
        checklist: &[ChecklistItemInput],
        comments: &[CommentInput],
    ) -> RepoResult<TaskId> {
        task.validate()?;
        for item in checklist {
            item.validate()?;
        }
        for comment in comments {
            comment.validate()?;
        }

        let tx = immediate_tx(self.conn)?;
        if !project_exists(&tx, task.project_id)? {
            return Err(ValidationError::ProjectNotFound(task.project_id).into());
        }

        tx.execute(
            "INSERT INTO tasks (
                id,
                project_id,
                title,
                description,
                completed,
                deadline,
                deadline_time,
                priority,
                time_spent,
                timer_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                task.id.to_string(),
                task.project_id.to_string(),
                task.title.trim(),
                task.description.as_deref(),
                bool_to_int(task.completed),
                task.deadline.as_deref(),
                task.deadline_time.as_deref(),
                priority_to_db(task.priority),
                task.time_spent,
                bool_to_int(task.timer_active),
            ],
        )?;

        for item in checklist {
            insert_item(&tx, task.id, &item.text, item.completed.unwrap_or(false))?;
        }
        for comment in comments {
            insert_comment(&tx, task.id, &comment.text)?;
        }

        tx.commit()?;
        Ok(task.id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        load_task(self.conn, id)
    }

    fn get_task_aggregate(&self, id: TaskId) -> RepoResult<Option<TaskAggregate>> {
        let tx = read_tx(self.conn)?;
        let aggregate = load_task(&tx, id)?
            .map(|task| load_children(&tx, task))
            .transpose()?;
        tx.commit()?;
        Ok(aggregate)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        query_tasks(self.conn, query)
    }

    fn list_task_aggregates(&self, query: &TaskListQuery) -> RepoResult<Vec<TaskAggregate>> {
        let tx = read_tx(self.conn)?;
        let aggregates = query_tasks(&tx, query)?
            .into_iter()
            .map(|task| load_children(&tx, task))
            .collect::<RepoResult<Vec<_>>>()?;
        tx.commit()?;
        Ok(aggregates)
    }

    fn update_task(
        &self,
        id: TaskId,
        patch: &TaskPatch,
        checklist: Option<&[ChecklistItemInput]>,
    ) -> RepoResult<ChecklistSync> {
        patch.validate()?;
        for item in checklist.unwrap_or_default() {
            item.validate()?;
        }

        let tx = immediate_tx(self.conn)?;
        let mut task = load_task(&tx, id)?.ok_or(RepoError::NotFound {
            entity: EntityKind::Task,
            id,
        })?;

        if let Some(project_id) = patch.project_id {
            if project_id != task.project_id && !project_exists(&tx, project_id)? {
                return Err(ValidationError::ProjectNotFound(project_id).into());
            }
        }

        patch.apply_to(&mut task);
        task.validate()?;

        tx.execute(
            &format!(
                "UPDATE tasks
                 SET
                    project_id = ?2,
                    title = ?3,
                    description = ?4,
                    completed = ?5,
                    deadline = ?6,
                    deadline_time = ?7,
                    priority = ?8,
                    time_spent = MAX(time_spent, ?9),
                    timer_active = ?10,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![
                id.to_string(),
                task.project_id.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                bool_to_int(task.completed),
                task.deadline.as_deref(),
                task.deadline_time.as_deref(),
                priority_to_db(task.priority),
                task.time_spent,
                bool_to_int(task.timer_active),
            ],
        )?;

        let sync = match checklist {
            Some(desired) => reconcile_checklist(&tx, id, desired)?,
            None => ChecklistSync::default(),
        };

        tx.commit()?;
        Ok(sync)
    }

    fn update_time(&self, id: TaskId, time_spent: i64) -> RepoResult<bool> {
        require_non_negative(time_spent)?;
        let changed = self.conn.execute(
            &format!(
                "UPDATE tasks
                 SET
                    time_spent = ?2,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1
                   AND time_spent < ?2;"
            ),
            params![id.to_string(), time_spent],
        )?;
        if changed > 0 {
            return Ok(true);
        }

        if task_exists(self.conn, id)? {
            Ok(false)
        } else {
            Err(RepoError::NotFound {
                entity: EntityKind::Task,
                id,
            })
        }
    }

    fn update_timer(&self, id: TaskId, time_spent: i64, timer_active: bool) -> RepoResult<()> {
        require_non_negative(time_spent)?;
        let changed = self.conn.execute(
            &format!(
                "UPDATE tasks
                 SET
                    time_spent = ?2,
                    timer_active = ?3,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![id.to_string(), time_spent, bool_to_int(timer_active)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Task,
                id,
            });
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<CascadeSummary> {
        let tx = immediate_tx(self.conn)?;
        if !task_exists(&tx, id)? {
            return Err(RepoError::NotFound {
                entity: EntityKind::Task,
                id,
            });
        }

        let task_id = id.to_string();
        let checklist_items = tx.execute(
            "DELETE FROM checklist_items WHERE task_id = ?1;",
            [task_id.as_str()],
        )?;
        let comments = tx.execute("DELETE FROM comments WHERE task_id = ?1;", [task_id.as_str()])?;
        let tasks = tx.execute("DELETE FROM tasks WHERE id = ?1;", [task_id.as_str()])?;
        tx.commit()?;

        Ok(CascadeSummary {
            projects: 0,
            tasks,
            checklist_items,
            comments,
        })
    }
}

/// Syncs the checklist of `task_id` to `desired`.
///
/// Entries naming an existing item of this task update it in place; every
/// other entry creates a new item; existing items not named are deleted.
/// An empty `desired` therefore deletes the whole checklist.
fn reconcile_checklist(
    conn: &Connection,
    task_id: TaskId,
    desired: &[ChecklistItemInput],
) -> RepoResult<ChecklistSync> {
    let mut remaining: HashSet<ChecklistItemId> = list_items_for_task(conn, task_id)?
        .into_iter()
        .map(|item| item.id)
        .collect();
    let mut sync = ChecklistSync::default();

    for entry in desired {
        match entry.item_id().filter(|id| remaining.remove(id)) {
            Some(item_id) => {
                update_item_fields(conn, item_id, Some(entry.text.as_str()), entry.completed)?;
                sync.updated += 1;
            }
            None => {
                insert_item(
                    conn,
                    task_id,
                    entry.text.as_str(),
                    entry.completed.unwrap_or(false),
                )?;
                sync.created += 1;
            }
        }
    }

    for stale_id in remaining {
        sync.deleted += delete_item_row(conn, stale_id)?;
    }

    Ok(sync)
}

fn query_tasks(conn: &Connection, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
    let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(project_id) = query.project_id {
        sql.push_str(" AND project_id = ?");
        bind_values.push(Value::Text(project_id.to_string()));
    }
    sql.push_str(" ORDER BY created_at DESC, rowid DESC");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)?);
    }
    Ok(tasks)
}

fn load_task(conn: &Connection, id: TaskId) -> RepoResult<Option<Task>> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_task_row(row)?));
    }
    Ok(None)
}

fn load_children(conn: &Connection, task: Task) -> RepoResult<TaskAggregate> {
    let checklist = list_items_for_task(conn, task.id)?;
    let comments = list_comments_for_task(conn, task.id, CommentOrder::OldestFirst)?;
    Ok(TaskAggregate {
        task,
        checklist,
        comments,
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let project_id_text: String = row.get("project_id")?;
    let priority_text: String = row.get("priority")?;
    let priority = parse_priority(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    Ok(Task {
        id: parse_uuid(&id_text, "tasks.id")?,
        project_id: parse_uuid(&project_id_text, "tasks.project_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        completed: parse_flag(row.get("completed")?, "tasks.completed")?,
        deadline: row.get("deadline")?,
        deadline_time: row.get("deadline_time")?,
        priority,
        time_spent: row.get("time_spent")?,
        timer_active: parse_flag(row.get("timer_active")?, "tasks.timer_active")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn priority_to_db(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn parse_priority(value: &str) -> Option<Priority> {
    match value {
        "low" => Some(Priority::Low),
        "medium" => Some(Priority::Medium),
        "high" => Some(Priority::High),
        _ => None,
    }
}
