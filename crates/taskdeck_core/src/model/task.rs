//! Task domain model.
//!
//! # Responsibility
//! - Define the task record, its insert shape and its update overlay.
//! - Own deadline parsing and the `time_spent` monotonicity rule.
//!
//! # Invariants
//! - `title` is never blank.
//! - `time_spent` is non-negative seconds.
//! - `deadline`, when set, parses as a calendar date via [`parse_deadline`].
//! - Applying a [`TaskPatch`] never lowers `time_spent`.

use crate::model::checklist::ChecklistItem;
use crate::model::comment::Comment;
use crate::model::project::ProjectId;
use crate::model::validation::{require_non_negative, require_text, ValidationError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

const NAIVE_DEADLINE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Task urgency. Defaults to `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Persisted task record without its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Owning project. Changes only through an explicit reassignment.
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Caller-supplied deadline text, validated as a calendar date.
    pub deadline: Option<String>,
    /// Free-form time-of-day hint, stored verbatim.
    pub deadline_time: Option<String>,
    pub priority: Priority,
    /// Tracked seconds.
    pub time_spent: i64,
    pub timer_active: bool,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Task {
    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_task_fields(&self.title, self.time_spent, self.deadline.as_deref())
    }
}

/// A task loaded together with its owned children.
///
/// Only produced by explicit "with children" reads; bare reads return
/// [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAggregate {
    #[serde(flatten)]
    pub task: Task,
    /// Ascending creation order.
    pub checklist: Vec<ChecklistItem>,
    /// Ascending creation order.
    pub comments: Vec<Comment>,
}

/// Insert shape for a new task, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub deadline: Option<String>,
    pub deadline_time: Option<String>,
    pub priority: Priority,
    pub time_spent: i64,
    pub timer_active: bool,
}

impl NewTask {
    /// Creates an insert shape with a generated id and default field values.
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: title.into(),
            description: None,
            completed: false,
            deadline: None,
            deadline_time: None,
            priority: Priority::default(),
            time_spent: 0,
            timer_active: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_task_fields(&self.title, self.time_spent, self.deadline.as_deref())
    }
}

fn validate_task_fields(
    title: &str,
    time_spent: i64,
    deadline: Option<&str>,
) -> Result<(), ValidationError> {
    require_text(title, ValidationError::EmptyTitle)?;
    require_non_negative(time_spent)?;
    if let Some(deadline) = deadline {
        parse_deadline(deadline)?;
    }
    Ok(())
}

/// Field-by-field overlay for task updates.
///
/// `None` means "not supplied, leave untouched". For nullable fields the
/// inner option distinguishes "set" (`Some(Some(_))`) from "clear"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub deadline: Option<Option<String>>,
    pub deadline_time: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub time_spent: Option<i64>,
    pub timer_active: Option<bool>,
    pub project_id: Option<ProjectId>,
}

impl TaskPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = self.title.as_deref() {
            require_text(title, ValidationError::EmptyTitle)?;
        }
        if let Some(time_spent) = self.time_spent {
            require_non_negative(time_spent)?;
        }
        if let Some(Some(deadline)) = self.deadline.as_ref() {
            parse_deadline(deadline)?;
        }
        Ok(())
    }

    /// Overlays supplied fields onto `task`.
    ///
    /// `time_spent` only moves forward: a supplied value below the stored one
    /// is ignored, so a stale full-entity save cannot undo timer progress.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(deadline) = &self.deadline {
            task.deadline = deadline.clone();
        }
        if let Some(deadline_time) = &self.deadline_time {
            task.deadline_time = deadline_time.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(time_spent) = self.time_spent {
            task.time_spent = task.time_spent.max(time_spent);
        }
        if let Some(timer_active) = self.timer_active {
            task.timer_active = timer_active;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
    }
}

/// Parses caller-supplied deadline text into a calendar date.
///
/// Accepted shapes: `YYYY-MM-DD`, RFC 3339 date-times (converted to the UTC
/// date) and naive `YYYY-MM-DDTHH:MM[:SS[.f]]` date-times.
pub fn parse_deadline(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidDeadline(raw.to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(date_time.with_timezone(&Utc).date_naive());
    }
    NAIVE_DEADLINE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|date_time| date_time.date())
        .ok_or_else(|| ValidationError::InvalidDeadline(raw.to_string()))
}

/// Validates deadline text and returns the form that gets stored.
pub fn normalize_deadline(raw: &str) -> Result<String, ValidationError> {
    parse_deadline(raw)?;
    Ok(raw.trim().to_string())
}

/// Deserializes a present-but-null field as `Some(None)`.
///
/// Paired with `#[serde(default)]` so an absent field stays `None`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
