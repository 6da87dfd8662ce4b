//! Checklist item use-case service.
//!
//! Standalone item operations used outside task reconciliation, e.g. when
//! a single box is ticked.

use crate::model::checklist::{ChecklistItem, ChecklistItemId, ChecklistItemPatch};
use crate::model::task::TaskId;
use crate::repo::checklist_repo::ChecklistRepository;
use crate::repo::EntityKind;
use crate::service::{observe, ServiceError, ServiceResult};
use log::{debug, info};

/// Checklist service facade over repository implementations.
pub struct ChecklistService<R: ChecklistRepository> {
    repo: R,
}

impl<R: ChecklistRepository> ChecklistService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends one item to an existing task.
    pub fn add_item(
        &self,
        task_id: TaskId,
        text: &str,
        completed: bool,
    ) -> ServiceResult<ChecklistItem> {
        let item = observe(
            "checklist_add",
            self.repo.create_item(task_id, text, completed),
        )?;
        info!(
            "event=checklist_add module=service status=ok task_id={} item_id={}",
            task_id, item.id
        );
        Ok(item)
    }

    pub fn list_items(&self, task_id: TaskId) -> ServiceResult<Vec<ChecklistItem>> {
        observe("checklist_list", self.repo.list_items(task_id))
    }

    /// Applies the overlay and returns the stored item.
    pub fn update_item(
        &self,
        id: ChecklistItemId,
        patch: ChecklistItemPatch,
    ) -> ServiceResult<ChecklistItem> {
        observe("checklist_update", self.repo.update_item(id, &patch))?;
        debug!(
            "event=checklist_update module=service status=ok item_id={}",
            id
        );
        observe("checklist_update", self.repo.get_item(id))?
            .ok_or(ServiceError::not_found(EntityKind::ChecklistItem, id))
    }

    pub fn delete_item(&self, id: ChecklistItemId) -> ServiceResult<()> {
        observe("checklist_delete", self.repo.delete_item(id))?;
        info!(
            "event=checklist_delete module=service status=ok item_id={}",
            id
        );
        Ok(())
    }
}
