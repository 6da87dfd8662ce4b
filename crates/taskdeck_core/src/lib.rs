//! Core domain logic for Taskdeck.
//! Projects own tasks; tasks own checklist items and comments. This crate
//! keeps that aggregate consistent across writes and serves read-side
//! analytics over the same store.

pub mod analytics;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analytics::projector::{
    checklist_progress, completion_over_time, completion_over_time_at, summary,
    tasks_by_priority, tasks_by_project, tasks_by_status, time_by_project, CompletionPoint,
    PriorityBreakdown, ProjectHours, ProjectTaskCount, StatusBreakdown, Summary,
};
pub use analytics::{AnalyticsError, AnalyticsResult, CompletionRange};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::checklist::{ChecklistItem, ChecklistItemId, ChecklistItemInput, ChecklistItemPatch};
pub use model::comment::{Comment, CommentId, CommentInput};
pub use model::project::{NewProject, Project, ProjectId, ProjectPatch};
pub use model::task::{
    parse_deadline, NewTask, Priority, Task, TaskAggregate, TaskId, TaskPatch,
};
pub use model::validation::ValidationError;
pub use repo::checklist_repo::{ChecklistRepository, SqliteChecklistRepository};
pub use repo::comment_repo::{CommentRepository, SqliteCommentRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::task_repo::{ChecklistSync, SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::{CascadeSummary, EntityKind, RepoError, RepoResult};
pub use service::checklist_service::ChecklistService;
pub use service::comment_service::CommentService;
pub use service::project_service::ProjectService;
pub use service::task_service::{CreateTaskRequest, ProjectRef, TaskService, UpdateTaskRequest};
pub use service::{ErrorKind, ServiceError, ServiceResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
