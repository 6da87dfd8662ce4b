//! Project store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `projects`.
//! - Own the project-level cascade: project → tasks → checklist/comments.
//!
//! # Invariants
//! - Project deletion removes children before parents in one transaction;
//!   on failure nothing is removed.

use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::repo::{
    ensure_connection_ready, immediate_tx, parse_uuid, project_exists, CascadeSummary,
    EntityKind, RepoError, RepoResult, NOW_MS_SQL,
};
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    created_at,
    updated_at
FROM projects";

/// Repository interface for projects.
pub trait ProjectRepository {
    fn create_project(&self, project: &NewProject) -> RepoResult<Project>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Lists projects in creation order.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<Project>;
    /// Deletes a project and every task, checklist item and comment under it.
    fn delete_project(&self, id: ProjectId) -> RepoResult<CascadeSummary>;
}

/// SQLite-backed project store.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &NewProject) -> RepoResult<Project> {
        project.validate()?;
        self.conn.execute(
            "INSERT INTO projects (id, name, description) VALUES (?1, ?2, ?3);",
            params![
                project.id.to_string(),
                project.name.trim(),
                project.description.as_deref(),
            ],
        )?;
        load_required_project(self.conn, project.id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        load_project(self.conn, id)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<Project> {
        patch.validate()?;
        let tx = immediate_tx(self.conn)?;
        let mut project = load_project(&tx, id)?.ok_or(RepoError::NotFound {
            entity: EntityKind::Project,
            id,
        })?;
        patch.apply_to(&mut project);

        tx.execute(
            &format!(
                "UPDATE projects
                 SET
                    name = ?2,
                    description = ?3,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![
                id.to_string(),
                project.name.as_str(),
                project.description.as_deref(),
            ],
        )?;
        let updated = load_required_project(&tx, id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<CascadeSummary> {
        let tx = immediate_tx(self.conn)?;
        if !project_exists(&tx, id)? {
            return Err(RepoError::NotFound {
                entity: EntityKind::Project,
                id,
            });
        }

        let project_id = id.to_string();
        let checklist_items = tx.execute(
            "DELETE FROM checklist_items
             WHERE task_id IN (SELECT id FROM tasks WHERE project_id = ?1);",
            [project_id.as_str()],
        )?;
        let comments = tx.execute(
            "DELETE FROM comments
             WHERE task_id IN (SELECT id FROM tasks WHERE project_id = ?1);",
            [project_id.as_str()],
        )?;
        let tasks = tx.execute(
            "DELETE FROM tasks WHERE project_id = ?1;",
            [project_id.as_str()],
        )?;
        let projects = tx.execute("DELETE FROM projects WHERE id = ?1;", [project_id.as_str()])?;
        tx.commit()?;

        Ok(CascadeSummary {
            projects,
            tasks,
            checklist_items,
            comments,
        })
    }
}

fn load_project(conn: &Connection, id: ProjectId) -> RepoResult<Option<Project>> {
    let mut stmt = conn.prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_project_row(row)?));
    }
    Ok(None)
}

fn load_required_project(conn: &Connection, id: ProjectId) -> RepoResult<Project> {
    load_project(conn, id)?.ok_or(RepoError::NotFound {
        entity: EntityKind::Project,
        id,
    })
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    Ok(Project {
        id: parse_uuid(&id_text, "projects.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
