//! Input validation errors shared by every write path.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Malformed or missing caller input, detected before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task title is blank after trim.
    EmptyTitle,
    /// Task creation did not reference a project.
    MissingProject,
    /// Referenced project does not exist.
    ProjectNotFound(Uuid),
    /// Deadline text is not a recognizable calendar date.
    InvalidDeadline(String),
    /// `time_spent` must be non-negative seconds.
    NegativeTimeSpent(i64),
    /// Checklist item text is blank after trim.
    EmptyChecklistText,
    /// Comment text is blank after trim.
    EmptyCommentText,
    /// Project name is blank after trim.
    EmptyProjectName,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be blank"),
            Self::MissingProject => write!(f, "task must reference a project"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::InvalidDeadline(raw) => {
                write!(f, "invalid deadline `{raw}`; expected a calendar date")
            }
            Self::NegativeTimeSpent(value) => {
                write!(f, "time spent must be non-negative, got {value}")
            }
            Self::EmptyChecklistText => write!(f, "checklist item text must not be blank"),
            Self::EmptyCommentText => write!(f, "comment text must not be blank"),
            Self::EmptyProjectName => write!(f, "project name must not be blank"),
        }
    }
}

impl Error for ValidationError {}

/// Rejects values that are empty after trimming.
pub(crate) fn require_text(value: &str, error: ValidationError) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error);
    }
    Ok(())
}

pub(crate) fn require_non_negative(time_spent: i64) -> Result<(), ValidationError> {
    if time_spent < 0 {
        return Err(ValidationError::NegativeTimeSpent(time_spent));
    }
    Ok(())
}
