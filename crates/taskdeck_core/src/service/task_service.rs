//! Task aggregate use-case service.
//!
//! # Responsibility
//! - Turn create/update requests into validated [`NewTask`] / [`TaskPatch`]
//!   values plus child inputs.
//! - Resolve project references (`projectId`, raw id or `{ "id": … }`).
//! - Expose the two time-tracking paths with their distinct rules.
//!
//! # Invariants
//! - Deadline text is validated before any write; blank text clears it.
//! - Caller-supplied checklist ids never become persisted ids on create.
//! - An update never changes `project_id` unless a project is supplied.
//! - `update_time` only moves `time_spent` forward; `update_timer` overwrites.

use crate::model::checklist::ChecklistItemInput;
use crate::model::comment::CommentInput;
use crate::model::project::ProjectId;
use crate::model::task::{
    double_option, normalize_deadline, NewTask, Priority, Task, TaskAggregate, TaskId, TaskPatch,
};
use crate::model::validation::ValidationError;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::EntityKind;
use crate::service::{observe, ServiceError, ServiceResult};
use log::{debug, info};
use serde::Deserialize;

/// Project reference accepted on the wire: a bare id or an object with `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProjectRef {
    Id(ProjectId),
    Object { id: ProjectId },
}

impl ProjectRef {
    pub fn id(&self) -> ProjectId {
        match self {
            Self::Id(id) | Self::Object { id } => *id,
        }
    }
}

/// Request model for creating a task with optional initial children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub deadline_time: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub time_spent: Option<i64>,
    #[serde(default)]
    pub timer_active: Option<bool>,
    /// Takes precedence over `project` when both are present.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItemInput>,
    #[serde(default)]
    pub comments: Vec<CommentInput>,
}

impl CreateTaskRequest {
    /// Minimal request: a title under one project.
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    fn into_parts(
        self,
    ) -> Result<(NewTask, Vec<ChecklistItemInput>, Vec<CommentInput>), ValidationError> {
        let project_id = self
            .project_id
            .or(self.project.map(|project| project.id()))
            .ok_or(ValidationError::MissingProject)?;

        let mut task = NewTask::new(project_id, self.title.trim());
        task.description = self.description;
        task.completed = self.completed.unwrap_or(false);
        task.deadline = self
            .deadline
            .as_deref()
            .map(normalize_optional_deadline)
            .transpose()?
            .flatten();
        task.deadline_time = self.deadline_time;
        task.priority = self.priority.unwrap_or_default();
        task.time_spent = self.time_spent.unwrap_or(0);
        task.timer_active = self.timer_active.unwrap_or(false);
        task.validate()?;

        for item in &self.checklist {
            item.validate()?;
        }
        for comment in &self.comments {
            comment.validate()?;
        }

        Ok((task, self.checklist, self.comments))
    }
}

/// Request model for a PATCH-style task update.
///
/// Absent fields are left untouched. Nullable fields accept `null` to clear.
/// `checklist`, when present, is the desired end state of the checklist;
/// an empty list deletes every item, an absent list leaves items alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub deadline: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub deadline_time: Option<Option<String>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub time_spent: Option<i64>,
    #[serde(default)]
    pub timer_active: Option<bool>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Takes precedence over `project_id` when both are present.
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default)]
    pub checklist: Option<Vec<ChecklistItemInput>>,
}

impl UpdateTaskRequest {
    fn into_parts(self) -> Result<(TaskPatch, Option<Vec<ChecklistItemInput>>), ValidationError> {
        let deadline = match self.deadline {
            Some(Some(raw)) => Some(normalize_optional_deadline(&raw)?),
            Some(None) => Some(None),
            None => None,
        };

        let patch = TaskPatch {
            title: self.title.map(|title| title.trim().to_string()),
            description: self.description,
            completed: self.completed,
            deadline,
            deadline_time: self.deadline_time,
            priority: self.priority,
            time_spent: self.time_spent,
            timer_active: self.timer_active,
            project_id: self.project.map(|project| project.id()).or(self.project_id),
        };
        patch.validate()?;

        if let Some(items) = &self.checklist {
            for item in items {
                item.validate()?;
            }
        }

        Ok((patch, self.checklist))
    }
}

/// Task aggregate service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a task with its initial checklist and comments.
    ///
    /// # Contract
    /// - Fails with `Validation` for a blank title, a missing or unknown
    ///   project, or an unparseable deadline; nothing is written then.
    /// - Checklist order is preserved; every item gets a fresh id.
    /// - Returns the task re-read with all children.
    pub fn create_task(&self, request: CreateTaskRequest) -> ServiceResult<TaskAggregate> {
        let (task, checklist, comments) = request.into_parts().map_err(|err| {
            let err = ServiceError::from(err);
            super::log_failure("task_create", &err);
            err
        })?;

        let task_id = observe(
            "task_create",
            self.repo.create_task(&task, &checklist, &comments),
        )?;
        info!(
            "event=task_create module=service status=ok task_id={} project_id={} checklist={} comments={}",
            task_id,
            task.project_id,
            checklist.len(),
            comments.len()
        );

        self.read_back(task_id, "created task not found in read-back")
    }

    /// Applies a PATCH-style update and optional checklist reconciliation.
    ///
    /// # Contract
    /// - Fails with `NotFound` when the task does not exist.
    /// - A supplied project reference must name an existing project.
    /// - A supplied `time_spent` below the stored value is ignored.
    /// - Returns the task re-read with all children.
    pub fn update_task(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> ServiceResult<TaskAggregate> {
        let (patch, checklist) = request.into_parts().map_err(|err| {
            let err = ServiceError::from(err);
            super::log_failure("task_update", &err);
            err
        })?;

        let sync = observe(
            "task_update",
            self.repo.update_task(id, &patch, checklist.as_deref()),
        )?;
        info!(
            "event=task_update module=service status=ok task_id={} checklist_synced={} checklist_updated={} checklist_created={} checklist_deleted={}",
            id,
            checklist.is_some(),
            sync.updated,
            sync.created,
            sync.deleted
        );

        self.read_back(id, "updated task not found in read-back")
    }

    /// Records timer progress; values not above the stored one are ignored.
    pub fn update_time(&self, id: TaskId, time_spent: i64) -> ServiceResult<()> {
        let applied = observe("task_time", self.repo.update_time(id, time_spent))?;
        if applied {
            debug!(
                "event=task_time module=service status=ok task_id={} time_spent={}",
                id, time_spent
            );
        } else {
            debug!(
                "event=task_time module=service status=skipped task_id={} time_spent={} reason=not_greater",
                id, time_spent
            );
        }
        Ok(())
    }

    /// Authoritative timer sync: sets both fields regardless of direction.
    pub fn update_timer(
        &self,
        id: TaskId,
        time_spent: i64,
        timer_active: bool,
    ) -> ServiceResult<()> {
        observe(
            "task_timer",
            self.repo.update_timer(id, time_spent, timer_active),
        )?;
        info!(
            "event=task_timer module=service status=ok task_id={} time_spent={} timer_active={}",
            id, time_spent, timer_active
        );
        Ok(())
    }

    /// Deletes a task together with its checklist items and comments.
    pub fn delete_task(&self, id: TaskId) -> ServiceResult<()> {
        let removed = observe("task_delete", self.repo.delete_task(id))?;
        info!(
            "event=task_delete module=service status=ok task_id={} checklist_items={} comments={}",
            id, removed.checklist_items, removed.comments
        );
        Ok(())
    }

    /// Loads one task with its children.
    pub fn get_task(&self, id: TaskId) -> ServiceResult<TaskAggregate> {
        observe("task_get", self.repo.get_task_aggregate(id))?
            .ok_or(ServiceError::not_found(EntityKind::Task, id))
    }

    /// Lists tasks newest first, without children.
    pub fn list_tasks(&self, project_id: Option<ProjectId>) -> ServiceResult<Vec<Task>> {
        observe(
            "task_list",
            self.repo.list_tasks(&TaskListQuery { project_id }),
        )
    }

    /// Lists tasks newest first, each with its children.
    pub fn list_tasks_with_children(
        &self,
        project_id: Option<ProjectId>,
    ) -> ServiceResult<Vec<TaskAggregate>> {
        observe(
            "task_list",
            self.repo.list_task_aggregates(&TaskListQuery { project_id }),
        )
    }

    fn read_back(&self, id: TaskId, details: &'static str) -> ServiceResult<TaskAggregate> {
        observe("task_read_back", self.repo.get_task_aggregate(id))?
            .ok_or(ServiceError::InconsistentState(details))
    }
}

/// Blank deadline text means "no deadline"; anything else must parse.
fn normalize_optional_deadline(raw: &str) -> Result<Option<String>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    normalize_deadline(raw).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{CreateTaskRequest, ProjectRef, UpdateTaskRequest};
    use crate::model::task::Priority;
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    #[test]
    fn project_ref_accepts_raw_id_and_object() {
        let id = Uuid::new_v4();
        let raw: ProjectRef = serde_json::from_str(&format!("\"{id}\"")).unwrap();
        let object: ProjectRef = serde_json::from_str(&format!("{{\"id\":\"{id}\"}}")).unwrap();
        assert_eq!(raw.id(), id);
        assert_eq!(object.id(), id);
    }

    #[test]
    fn create_request_prefers_project_id_and_applies_defaults() {
        let explicit = Uuid::new_v4();
        let fallback = Uuid::new_v4();
        let request = CreateTaskRequest {
            title: "  plan sprint ".to_string(),
            project_id: Some(explicit),
            project: Some(ProjectRef::Id(fallback)),
            ..CreateTaskRequest::default()
        };

        let (task, checklist, comments) = request.into_parts().unwrap();
        assert_eq!(task.project_id, explicit);
        assert_eq!(task.title, "plan sprint");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.time_spent, 0);
        assert!(checklist.is_empty());
        assert!(comments.is_empty());
    }

    #[test]
    fn create_request_without_project_is_rejected() {
        let request = CreateTaskRequest {
            title: "orphan".to_string(),
            ..CreateTaskRequest::default()
        };
        assert_eq!(
            request.into_parts().unwrap_err(),
            ValidationError::MissingProject
        );
    }

    #[test]
    fn create_request_blank_deadline_means_none() {
        let mut request = CreateTaskRequest::new(Uuid::new_v4(), "t");
        request.deadline = Some("  ".to_string());
        let (task, _, _) = request.into_parts().unwrap();
        assert_eq!(task.deadline, None);
    }

    #[test]
    fn update_request_distinguishes_null_absent_and_empty_checklist() {
        let absent: UpdateTaskRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.description, None);
        assert_eq!(absent.checklist, None);

        let cleared: UpdateTaskRequest =
            serde_json::from_str(r#"{"description":null,"checklist":[]}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert_eq!(cleared.checklist, Some(Vec::new()));
    }

    #[test]
    fn update_request_deserializes_camel_case_wire_names() {
        let project = Uuid::new_v4();
        let json = format!(
            r#"{{"timeSpent":42,"timerActive":true,"deadlineTime":"09:00","priority":"high","project":{{"id":"{project}"}},"checklist":[{{"id":"temp-1","text":"x","completed":true}}]}}"#
        );
        let request: UpdateTaskRequest = serde_json::from_str(&json).unwrap();
        let (patch, checklist) = request.into_parts().unwrap();
        assert_eq!(patch.time_spent, Some(42));
        assert_eq!(patch.timer_active, Some(true));
        assert_eq!(patch.deadline_time, Some(Some("09:00".to_string())));
        assert_eq!(patch.priority, Some(Priority::High));
        assert_eq!(patch.project_id, Some(project));
        let checklist = checklist.unwrap();
        assert_eq!(checklist[0].id.as_deref(), Some("temp-1"));
        assert_eq!(checklist[0].item_id(), None);
    }

    #[test]
    fn update_request_prefers_project_reference_over_project_id() {
        let stale = Uuid::new_v4();
        let target = Uuid::new_v4();
        let json = format!(r#"{{"projectId":"{stale}","project":{{"id":"{target}"}}}}"#);
        let request: UpdateTaskRequest = serde_json::from_str(&json).unwrap();
        let (patch, _) = request.into_parts().unwrap();
        assert_eq!(patch.project_id, Some(target));

        let only_id: UpdateTaskRequest =
            serde_json::from_str(&format!(r#"{{"projectId":"{stale}"}}"#)).unwrap();
        assert_eq!(only_id.into_parts().unwrap().0.project_id, Some(stale));
    }

    #[test]
    fn update_request_rejects_invalid_deadline() {
        let request = UpdateTaskRequest {
            deadline: Some(Some("not a date".to_string())),
            ..UpdateTaskRequest::default()
        };
        assert_eq!(
            request.into_parts().unwrap_err(),
            ValidationError::InvalidDeadline("not a date".to_string())
        );
    }
}
