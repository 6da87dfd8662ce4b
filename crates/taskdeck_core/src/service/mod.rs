//! Core use-case services.
//!
//! # Responsibility
//! - Normalize caller requests into validated repository inputs.
//! - Orchestrate repository calls into use-case level APIs.
//! - Re-signal storage failures as domain errors.
//!
//! # Invariants
//! - Validation happens before any write.
//! - Callers can always tell `NotFound`, validation, constraint and storage
//!   failures apart via [`ServiceError::kind`].

use crate::model::validation::ValidationError;
use crate::repo::{EntityKind, RepoError};
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod checklist_service;
pub mod comment_service;
pub mod project_service;
pub mod task_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse error category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    ConstraintViolation,
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::ConstraintViolation => "constraint_violation",
            Self::Storage => "storage",
        }
    }
}

/// Error returned by every service operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any write.
    Validation(ValidationError),
    /// Referenced record does not exist.
    NotFound { entity: EntityKind, id: Uuid },
    /// Storage refused the write.
    ConstraintViolation(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal mismatch between a write and its read-back.
    InconsistentState(&'static str),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            Self::Repo(_) | Self::InconsistentState(_) => ErrorKind::Storage,
        }
    }

    fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::ConstraintViolation(message) => {
                write!(f, "storage constraint violated: {message}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::ConstraintViolation(message) => Self::ConstraintViolation(message),
            other => Self::Repo(other),
        }
    }
}

/// Emits one failure event; caller mistakes log at `warn`, storage at `error`.
pub(crate) fn log_failure(event: &'static str, err: &ServiceError) {
    match err.kind() {
        ErrorKind::Storage => error!(
            "event={} module=service status=error error_kind={} error={}",
            event,
            err.kind().as_str(),
            err
        ),
        kind => warn!(
            "event={} module=service status=rejected error_kind={} error={}",
            event,
            kind.as_str(),
            err
        ),
    }
}

/// Converts a repository result, logging the failure under `event`.
pub(crate) fn observe<T>(event: &'static str, result: Result<T, RepoError>) -> ServiceResult<T> {
    result.map_err(|err| {
        let err = ServiceError::from(err);
        log_failure(event, &err);
        err
    })
}
