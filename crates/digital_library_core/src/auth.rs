//! crates/digital_library_core/src/auth.rs
//!
//! Account lookups against the entity store.
//!
//! Passwords are compared in plain text. This is a local demo only; any
//! deployment beyond that needs hashed credentials.

use crate::domain::{Role, User, UserDraft};
use crate::error::{LibraryError, LibraryResult};
use crate::store::EntityStore;

pub fn login(store: &EntityStore, email: &str, password: &str) -> LibraryResult<User> {
    store
        .users()
        .iter()
        .find(|u| u.email == email && u.password == password)
        .cloned()
        .ok_or(LibraryError::InvalidCredentials)
}

/// Creates an account for a student or a teacher.
///
/// Students must name an existing teacher; teachers never carry one.
pub fn register(store: &mut EntityStore, mut draft: UserDraft) -> LibraryResult<User> {
    if store.user_by_email(&draft.email).is_some() {
        return Err(LibraryError::EmailTaken(draft.email));
    }

    match draft.role {
        Role::Admin => return Err(LibraryError::NotAuthorized),
        Role::Teacher => draft.teacher_id = None,
        Role::Student => {
            let teacher_id = draft.teacher_id.ok_or_else(|| {
                LibraryError::InvalidInput("students must choose a teacher".to_string())
            })?;
            if !store.user(teacher_id).is_some_and(User::is_teacher) {
                return Err(LibraryError::UnknownTeacher(teacher_id));
            }
        }
    }

    Ok(store.create_user(draft))
}
