//! Project domain model.
//!
//! A project owns its tasks: deleting a project removes every task bound to
//! it, and through them every checklist item and comment.

use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = Uuid;

/// Persisted project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Insert shape for a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
}

impl NewProject {
    /// Creates an insert shape with a freshly generated id.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, ValidationError::EmptyProjectName)
    }
}

/// Field overlay for project updates. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::model::task::double_option")]
    pub description: Option<Option<String>>,
}

impl ProjectPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.name.as_deref() {
            Some(name) => require_text(name, ValidationError::EmptyProjectName),
            None => Ok(()),
        }
    }

    pub fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
    }
}
