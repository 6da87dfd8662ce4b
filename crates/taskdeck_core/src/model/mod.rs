//! Domain model for the project/task aggregate.
//!
//! # Responsibility
//! - Define canonical records used by repositories, services and analytics.
//! - Keep validation rules next to the shapes they guard.
//!
//! # Invariants
//! - Every record is identified by a UUID assigned by core, never by callers.
//! - Checklist items and comments always belong to exactly one task; tasks
//!   always belong to exactly one project.

pub mod checklist;
pub mod comment;
pub mod project;
pub mod task;
pub mod validation;
