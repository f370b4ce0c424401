//! crates/digital_library_core/src/error.rs
//!
//! Typed failures for every library operation. A failed operation never
//! leaves a partial mutation behind.

use crate::domain::{ActivityLogId, ResourceId, UserId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LibraryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Resource {0} is already borrowed")]
    AlreadyBorrowed(ResourceId),

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Resource {0} is not held by the requesting student")]
    NotBorrower(ResourceId),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email {0} is already registered")]
    EmailTaken(String),

    #[error("Teacher {0} does not exist")]
    UnknownTeacher(UserId),

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Student {0} has no active reading session")]
    NoActiveSession(UserId),

    #[error("Activity log {0} no longer belongs to the active session")]
    StaleSession(ActivityLogId),

    #[error("Activity log {0} is finalized")]
    SessionFinalized(ActivityLogId),
}

pub type LibraryResult<T> = Result<T, LibraryError>;
