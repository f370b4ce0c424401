//! Lending flow tests
//!
//! End-to-end scenarios over the public `Library` API: borrowing, sampling,
//! returning and the staff dashboards that observe the result.

use chrono::{Duration, Utc};
use digital_library_core::{
    reports, router::{Navigator, Screen, Transition, View}, ActivityStatus, EntityStore,
    Library, LibraryError, ProgressSample, Resource, ResourceType, Role, TrackerState, User,
};

fn student(id: i64, teacher_id: i64) -> User {
    User {
        id,
        name: format!("Aluno {}", id),
        email: format!("aluno{}@aluno.com", id),
        password: "123".to_string(),
        role: Role::Student,
        institution: "Escola Modelo".to_string(),
        teacher_id: Some(teacher_id),
    }
}

fn teacher(id: i64) -> User {
    User {
        id,
        name: format!("Prof. {}", id),
        email: format!("prof{}@escola.com", id),
        password: "123".to_string(),
        role: Role::Teacher,
        institution: "Escola Modelo".to_string(),
        teacher_id: None,
    }
}

fn book(id: i64) -> Resource {
    Resource {
        id,
        kind: ResourceType::Book,
        title: "Duna".to_string(),
        author: "Frank Herbert".to_string(),
        synopsis: "Casas nobres lutam pelo controle de Arrakis.".to_string(),
        cover_url: "https://picsum.photos/seed/duna/300/400".to_string(),
        category: "Ficção Científica".to_string(),
        borrowed_by: None,
        content: Some("...".to_string()),
        audio_url: None,
        video_url: None,
    }
}

fn small_library() -> Library {
    let mut store = EntityStore::new();
    store.insert_user(teacher(1)).unwrap();
    store.insert_user(teacher(2)).unwrap();
    store.insert_user(student(101, 1)).unwrap();
    store.insert_user(student(102, 2)).unwrap();
    store.insert_resource(book(3)).unwrap();
    Library::new(store)
}

#[test]
fn borrow_then_return_leaves_the_session_open() {
    let t0 = Utc::now();
    let mut library = small_library();

    let log_id = library.borrow(3, 101, t0).unwrap();

    assert_eq!(library.store().resource(3).unwrap().borrowed_by, Some(101));
    let log = library.store().activity_log(log_id).unwrap();
    assert_eq!(log.student_id, 101);
    assert_eq!(log.resource_id, 3);
    assert_eq!(log.status, ActivityStatus::InProgress);
    assert_eq!(log.progress, 0.0);
    assert!(log.is_open());

    library.return_resource(3, 101).unwrap();

    // Returning does not finalize tracking: the log is still open and in progress.
    assert_eq!(library.store().resource(3).unwrap().borrowed_by, None);
    let log = library.store().activity_log(log_id).unwrap();
    assert!(log.is_open());
    assert_eq!(log.status, ActivityStatus::InProgress);
    assert!(matches!(library.tracker().state(101), TrackerState::Active(_)));
}

#[test]
fn borrowing_a_borrowed_resource_is_refused_without_side_effects() {
    let t0 = Utc::now();
    let mut library = small_library();
    library.borrow(3, 101, t0).unwrap();

    let resources = library.store().resources().to_vec();
    let logs = library.store().activity_logs().to_vec();

    assert_eq!(library.borrow(3, 102, t0), Err(LibraryError::AlreadyBorrowed(3)));
    assert_eq!(library.store().resources(), resources.as_slice());
    assert_eq!(library.store().activity_logs(), logs.as_slice());
}

#[test]
fn every_borrowed_resource_has_a_session_for_its_holder() {
    let t0 = Utc::now();
    let mut library = Library::seeded(t0);
    library.borrow(2, 102, t0).unwrap();
    library.borrow(4, 102, t0 + Duration::seconds(30)).unwrap();
    library.borrow(5, 101, t0).unwrap();

    for resource in library.store().resources() {
        if let Some(holder) = resource.borrowed_by {
            assert!(
                library
                    .store()
                    .logs_for_student(holder)
                    .any(|l| l.resource_id == resource.id),
                "resource {} has no session for student {}",
                resource.id,
                holder
            );
        }
    }
}

#[test]
fn reading_session_samples_until_the_student_leaves() {
    let t0 = Utc::now();
    let mut library = small_library();
    let mut navigator = Navigator::after_login(library.store().user(101).unwrap());

    let log_id = library.borrow(3, 101, t0).unwrap();
    navigator.navigate(View::Reading(3));
    let user = library.store().user(101).unwrap().clone();
    assert_eq!(navigator.screen(&user), Screen::Reading(3));

    let sample = |offset| ProgressSample::Scroll {
        offset,
        scrollable_height: 2000.0,
        viewport_height: 1000.0,
    };
    for (tick, offset) in [(1, 300.0), (2, 700.0), (3, 960.0)] {
        library
            .record_sample(101, log_id, sample(offset), t0 + Duration::seconds(2 * tick))
            .unwrap();
    }
    let log = library.store().activity_log(log_id).unwrap();
    assert_eq!(log.progress, 96.0);
    assert_eq!(log.duration_seconds, 6);

    assert_eq!(navigator.back_to_library(), Transition::LeftReading(3));
    let finished = library.close(101, t0 + Duration::seconds(7)).unwrap().unwrap();
    assert_eq!(finished.status, ActivityStatus::Completed);
    assert_eq!(navigator.screen(&user), Screen::Library);

    // A late tick from the old timer cannot touch the finalized log.
    assert_eq!(
        library.record_sample(101, log_id, sample(0.0), t0 + Duration::seconds(8)),
        Err(LibraryError::NoActiveSession(101))
    );
    assert_eq!(library.store().activity_log(log_id).unwrap().progress, 96.0);
}

#[test]
fn teacher_dashboard_is_scoped_to_assigned_students() {
    let t0 = Utc::now();
    let mut library = small_library();
    library.borrow(3, 102, t0).unwrap();
    library.close(102, t0 + Duration::seconds(10)).unwrap();

    let first = library.store().user(1).unwrap();
    let dashboard = reports::teacher_dashboard(library.store(), first).unwrap();
    assert_eq!(dashboard.students.len(), 1);
    assert_eq!(dashboard.students[0].student_id, 101);
    assert!(dashboard.students[0].entries.is_empty());

    let second = library.store().user(2).unwrap();
    let dashboard = reports::teacher_dashboard(library.store(), second).unwrap();
    assert_eq!(dashboard.students.len(), 1);
    assert_eq!(dashboard.students[0].student_id, 102);
    assert_eq!(dashboard.students[0].entries.len(), 1);
    assert_eq!(dashboard.students[0].entries[0].log.student_id, 102);
}
