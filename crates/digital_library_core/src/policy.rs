//! crates/digital_library_core/src/policy.rs
//!
//! Role-based authorization. `can_perform` is a pure predicate: callers check
//! it before mutating anything and refuse the request when it is false.

use crate::domain::{Resource, Role, User};

/// An action a user may attempt, together with its target where one exists.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    Borrow(&'a Resource),
    Return(&'a Resource),
    /// Open a held resource for reading, viewing or listening.
    Open(&'a Resource),
    AddResource,
    ViewAdminDashboard,
    ViewTeacherDashboard,
    /// Inspect a single student's activity logs.
    ViewStudentActivity(&'a User),
}

pub fn can_perform(user: &User, action: Action<'_>) -> bool {
    match action {
        Action::Borrow(resource) => user.role == Role::Student && resource.is_available(),
        Action::Return(resource) | Action::Open(resource) => {
            user.role == Role::Student && resource.is_held_by(user.id)
        }
        Action::AddResource => matches!(user.role, Role::Teacher | Role::Admin),
        Action::ViewAdminDashboard => user.role == Role::Admin,
        Action::ViewTeacherDashboard => user.role == Role::Teacher,
        Action::ViewStudentActivity(student) => {
            user.role == Role::Teacher
                && student.role == Role::Student
                && student.teacher_id == Some(user.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntityStore;
    use chrono::Utc;

    fn user(store: &EntityStore, id: i64) -> User {
        store.user(id).unwrap().clone()
    }

    #[test]
    fn only_students_borrow_and_only_free_resources() {
        let store = EntityStore::seeded(Utc::now());
        let free = store.resource(2).unwrap();
        let taken = store.resource(3).unwrap();

        assert!(can_perform(&user(&store, 101), Action::Borrow(free)));
        assert!(!can_perform(&user(&store, 101), Action::Borrow(taken)));
        assert!(!can_perform(&user(&store, 1), Action::Borrow(free)));
        assert!(!can_perform(&user(&store, 0), Action::Borrow(free)));
    }

    #[test]
    fn return_and_open_require_the_holder() {
        let store = EntityStore::seeded(Utc::now());
        let held_by_pedro = store.resource(3).unwrap();
        let free = store.resource(2).unwrap();

        assert!(can_perform(&user(&store, 103), Action::Return(held_by_pedro)));
        assert!(can_perform(&user(&store, 103), Action::Open(held_by_pedro)));
        assert!(!can_perform(&user(&store, 101), Action::Return(held_by_pedro)));
        assert!(!can_perform(&user(&store, 101), Action::Open(held_by_pedro)));
        assert!(!can_perform(&user(&store, 101), Action::Return(free)));
        assert!(!can_perform(&user(&store, 2), Action::Return(held_by_pedro)));
    }

    #[test]
    fn adding_resources_is_for_staff() {
        let store = EntityStore::seeded(Utc::now());
        assert!(can_perform(&user(&store, 0), Action::AddResource));
        assert!(can_perform(&user(&store, 1), Action::AddResource));
        assert!(!can_perform(&user(&store, 101), Action::AddResource));
    }

    #[test]
    fn dashboards_are_role_scoped() {
        let store = EntityStore::seeded(Utc::now());
        assert!(can_perform(&user(&store, 0), Action::ViewAdminDashboard));
        assert!(!can_perform(&user(&store, 1), Action::ViewAdminDashboard));
        assert!(can_perform(&user(&store, 1), Action::ViewTeacherDashboard));
        assert!(!can_perform(&user(&store, 0), Action::ViewTeacherDashboard));
        assert!(!can_perform(&user(&store, 101), Action::ViewTeacherDashboard));
    }

    #[test]
    fn teachers_see_only_their_own_students() {
        let store = EntityStore::seeded(Utc::now());
        let ana = user(&store, 1);
        let carlos = user(&store, 2);
        let joao = user(&store, 101);
        let pedro = user(&store, 103);

        assert!(can_perform(&ana, Action::ViewStudentActivity(&joao)));
        assert!(!can_perform(&ana, Action::ViewStudentActivity(&pedro)));
        assert!(can_perform(&carlos, Action::ViewStudentActivity(&pedro)));
        assert!(!can_perform(&ana, Action::ViewStudentActivity(&carlos)));
    }
}
