//! Project use-case service.
//!
//! # Responsibility
//! - Provide project create/get/list/update/delete APIs.
//! - Report the size of a project cascade delete.

use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::{CascadeSummary, EntityKind};
use crate::service::{log_failure, observe, ServiceError, ServiceResult};
use log::info;

/// Project service facade over repository implementations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a project; the name must be non-blank.
    pub fn create_project(
        &self,
        name: &str,
        description: Option<String>,
    ) -> ServiceResult<Project> {
        let project = NewProject::new(name.trim(), description);
        if let Err(err) = project.validate() {
            let err = ServiceError::from(err);
            log_failure("project_create", &err);
            return Err(err);
        }

        let created = observe("project_create", self.repo.create_project(&project))?;
        info!(
            "event=project_create module=service status=ok project_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn get_project(&self, id: ProjectId) -> ServiceResult<Project> {
        observe("project_get", self.repo.get_project(id))?
            .ok_or(ServiceError::not_found(EntityKind::Project, id))
    }

    /// Lists projects in creation order.
    pub fn list_projects(&self) -> ServiceResult<Vec<Project>> {
        observe("project_list", self.repo.list_projects())
    }

    pub fn update_project(&self, id: ProjectId, patch: ProjectPatch) -> ServiceResult<Project> {
        let updated = observe("project_update", self.repo.update_project(id, &patch))?;
        info!(
            "event=project_update module=service status=ok project_id={}",
            id
        );
        Ok(updated)
    }

    /// Deletes a project with all of its tasks and their children.
    pub fn delete_project(&self, id: ProjectId) -> ServiceResult<CascadeSummary> {
        let removed = observe("project_delete", self.repo.delete_project(id))?;
        info!(
            "event=project_delete module=service status=ok project_id={} tasks={} checklist_items={} comments={}",
            id, removed.tasks, removed.checklist_items, removed.comments
        );
        Ok(removed)
    }
}
