//! crates/digital_library_core/src/router.rs
//!
//! Decides which screen a signed-in user sees. Navigation state is an explicit
//! `View`; the user's role is resolved once into a `RoleView` carrying the
//! capabilities that screen may offer.

use crate::domain::{Resource, ResourceId, Role, User};
use crate::store::EntityStore;

/// The navigation state a user has asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Library,
    MyResources,
    /// Reading always refers to the resource being read.
    Reading(ResourceId),
    AdminDashboard,
}

/// What is actually rendered once role rules are applied to a `View`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Library,
    MyResources,
    Reading(ResourceId),
    AdminDashboard,
    TeacherDashboard,
}

/// Navigation entries and actions a role is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub browse_library: bool,
    pub my_resources: bool,
    pub borrow: bool,
    pub add_resource: bool,
    pub teacher_dashboard: bool,
    pub admin_dashboard: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleView {
    Student,
    Teacher,
    Admin,
}

impl RoleView {
    pub fn for_user(user: &User) -> Self {
        match user.role {
            Role::Student => RoleView::Student,
            Role::Teacher => RoleView::Teacher,
            Role::Admin => RoleView::Admin,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            RoleView::Student => Capabilities {
                browse_library: true,
                my_resources: true,
                borrow: true,
                add_resource: false,
                teacher_dashboard: false,
                admin_dashboard: false,
            },
            RoleView::Teacher => Capabilities {
                browse_library: true,
                my_resources: false,
                borrow: false,
                add_resource: true,
                teacher_dashboard: true,
                admin_dashboard: false,
            },
            RoleView::Admin => Capabilities {
                browse_library: true,
                my_resources: false,
                borrow: false,
                add_resource: true,
                teacher_dashboard: false,
                admin_dashboard: true,
            },
        }
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stayed,
    Moved,
    /// The user left the reading view; the caller must finalize the session.
    LeftReading(ResourceId),
}

/// Per-login navigation state.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    view: View,
}

impl Navigator {
    /// The landing view after a successful login.
    pub fn after_login(user: &User) -> Self {
        let view = if user.is_admin() {
            View::AdminDashboard
        } else {
            View::Library
        };
        Self { view }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn navigate(&mut self, view: View) -> Transition {
        if view == self.view {
            return Transition::Stayed;
        }
        let previous = std::mem::replace(&mut self.view, view);
        match previous {
            View::Reading(resource_id) => Transition::LeftReading(resource_id),
            _ => Transition::Moved,
        }
    }

    /// Leaves the reading view (if in it) for the library.
    pub fn back_to_library(&mut self) -> Transition {
        self.navigate(View::Library)
    }

    pub fn screen(&self, user: &User) -> Screen {
        resolve(self.view, user)
    }
}

/// Applies the role rules to a requested view.
///
/// The admin dashboard and reading win over role; a teacher otherwise always
/// lands on the teacher dashboard.
pub fn resolve(view: View, user: &User) -> Screen {
    let role_view = RoleView::for_user(user);
    match view {
        View::AdminDashboard if role_view == RoleView::Admin => Screen::AdminDashboard,
        View::Reading(resource_id) => Screen::Reading(resource_id),
        _ if role_view == RoleView::Teacher => Screen::TeacherDashboard,
        View::MyResources if role_view == RoleView::Student => Screen::MyResources,
        _ => Screen::Library,
    }
}

/// The resources listed on a catalog screen, computed on every read.
pub fn listed_resources<'a>(store: &'a EntityStore, user: &User, screen: Screen) -> Vec<&'a Resource> {
    match screen {
        Screen::MyResources => store.borrowed_by(user.id).collect(),
        Screen::Library => store.resources().iter().collect(),
        _ => Vec::new(),
    }
}
