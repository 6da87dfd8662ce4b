//! Comment domain model.

use crate::model::task::TaskId;
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable comment identifier.
pub type CommentId = Uuid;

/// Persisted comment, owned by one task.
///
/// Comments carry no update timestamp; only their text may be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub text: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}

/// Caller-supplied comment created alongside a task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    pub text: String,
}

impl CommentInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.text, ValidationError::EmptyCommentText)
    }
}
