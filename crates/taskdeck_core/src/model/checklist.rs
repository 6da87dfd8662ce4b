//! Checklist item domain model.

use crate::model::task::TaskId;
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable checklist item identifier.
pub type ChecklistItemId = Uuid;

/// Persisted checklist item, owned by one task.
///
/// Items of one task are listed in ascending creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub task_id: TaskId,
    pub text: String,
    pub completed: bool,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Field overlay for one checklist item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemPatch {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl ChecklistItemPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.text.as_deref() {
            Some(text) => require_text(text, ValidationError::EmptyChecklistText),
            None => Ok(()),
        }
    }
}

/// One entry of a caller-supplied checklist.
///
/// On task creation every entry becomes a new item. On task update the list
/// is the desired end state: entries whose `id` matches an existing item of
/// the task update it in place, all others create new items. The `id` stays
/// an opaque string so temporary client-side ids are simply treated as new.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemInput {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl ChecklistItemInput {
    /// Entry without a client id, which always creates a new item.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            completed: None,
        }
    }

    /// Entry targeting an existing item id.
    pub fn existing(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
            completed: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.text, ValidationError::EmptyChecklistText)
    }

    /// Returns the client id when it names a well-formed item id.
    pub fn item_id(&self) -> Option<ChecklistItemId> {
        self.id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
    }
}
