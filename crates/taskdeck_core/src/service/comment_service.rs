//! Comment use-case service.

use crate::model::comment::{Comment, CommentId};
use crate::model::task::TaskId;
use crate::repo::comment_repo::CommentRepository;
use crate::repo::EntityKind;
use crate::service::{observe, ServiceError, ServiceResult};
use log::info;

/// Comment service facade over repository implementations.
pub struct CommentService<R: CommentRepository> {
    repo: R,
}

impl<R: CommentRepository> CommentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn add_comment(&self, task_id: TaskId, text: &str) -> ServiceResult<Comment> {
        let comment = observe("comment_add", self.repo.create_comment(task_id, text))?;
        info!(
            "event=comment_add module=service status=ok task_id={} comment_id={}",
            task_id, comment.id
        );
        Ok(comment)
    }

    /// Lists comments of one task, newest first.
    pub fn list_comments(&self, task_id: TaskId) -> ServiceResult<Vec<Comment>> {
        observe("comment_list", self.repo.list_comments(task_id))
    }

    /// Replaces comment text and returns the stored comment.
    pub fn update_comment(&self, id: CommentId, text: &str) -> ServiceResult<Comment> {
        observe("comment_update", self.repo.update_comment(id, text))?;
        observe("comment_update", self.repo.get_comment(id))?
            .ok_or(ServiceError::not_found(EntityKind::Comment, id))
    }

    pub fn delete_comment(&self, id: CommentId) -> ServiceResult<()> {
        observe("comment_delete", self.repo.delete_comment(id))?;
        info!(
            "event=comment_delete module=service status=ok comment_id={}",
            id
        );
        Ok(())
    }
}
