//! crates/digital_library_core/src/coordinator.rs
//!
//! The borrow/return coordinator. `Library` owns the entity store and the
//! activity tracker and is the only place where resource ownership changes.
//! Every mutating operation checks the authorization policy first and fails
//! with a typed error, leaving the store untouched.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::auth;
use crate::domain::{
    ActivityLog, ActivityLogId, Resource, ResourceDraft, ResourceId, ResourceType, User,
    UserDraft, UserId,
};
use crate::error::{LibraryError, LibraryResult};
use crate::policy::{can_perform, Action};
use crate::store::{EntityStore, PLACEHOLDER_CONTENT};
use crate::tracker::{ActivityTracker, ProgressSample, SampleOutcome};

#[derive(Debug, Clone, Default)]
pub struct Library {
    store: EntityStore,
    tracker: ActivityTracker,
}

impl Library {
    pub fn new(store: EntityStore) -> Self {
        Self {
            store,
            tracker: ActivityTracker::new(),
        }
    }

    /// A library preloaded with the demo school.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self::new(EntityStore::seeded(now))
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn tracker(&self) -> &ActivityTracker {
        &self.tracker
    }

    //=====================================================================================
    // Accounts
    //=====================================================================================

    pub fn login(&self, email: &str, password: &str) -> LibraryResult<User> {
        auth::login(&self.store, email, password)
    }

    pub fn register(&mut self, draft: UserDraft) -> LibraryResult<User> {
        auth::register(&mut self.store, draft)
    }

    /// Ends whatever session the user had open.
    pub fn logout(&mut self, user_id: UserId, now: DateTime<Utc>) -> LibraryResult<Option<ActivityLog>> {
        self.tracker.finish(&mut self.store, user_id, now)
    }

    //=====================================================================================
    // Borrowing
    //=====================================================================================

    /// Lends a resource to a student and immediately opens it.
    ///
    /// Returns the id of the activity log the new session writes to.
    pub fn borrow(
        &mut self,
        resource_id: ResourceId,
        student_id: UserId,
        now: DateTime<Utc>,
    ) -> LibraryResult<ActivityLogId> {
        let student = self.store.require_user(student_id)?;
        let resource = self.store.require_resource(resource_id)?;

        if !can_perform(student, Action::Borrow(resource)) {
            return Err(if student.is_student() {
                LibraryError::AlreadyBorrowed(resource_id)
            } else {
                LibraryError::NotAuthorized
            });
        }

        self.store.set_borrowed_by(resource_id, Some(student_id))?;
        info!(student_id, resource_id, "Resource borrowed");
        self.tracker
            .start(&mut self.store, student_id, resource_id, now)
    }

    /// Gives a resource back.
    ///
    /// An open session on the resource is left running: returning does not
    /// finalize tracking.
    pub fn return_resource(
        &mut self,
        resource_id: ResourceId,
        student_id: UserId,
    ) -> LibraryResult<()> {
        let student = self.store.require_user(student_id)?;
        let resource = self.store.require_resource(resource_id)?;

        if !can_perform(student, Action::Return(resource)) {
            return Err(if student.is_student() {
                LibraryError::NotBorrower(resource_id)
            } else {
                LibraryError::NotAuthorized
            });
        }

        self.store.set_borrowed_by(resource_id, None)?;
        info!(student_id, resource_id, "Resource returned");
        Ok(())
    }

    //=====================================================================================
    // Reading sessions
    //=====================================================================================

    /// Opens a resource the student already holds.
    pub fn open(
        &mut self,
        resource_id: ResourceId,
        student_id: UserId,
        now: DateTime<Utc>,
    ) -> LibraryResult<ActivityLogId> {
        let student = self.store.require_user(student_id)?;
        let resource = self.store.require_resource(resource_id)?;

        if !can_perform(student, Action::Open(resource)) {
            return Err(if student.is_student() {
                LibraryError::NotBorrower(resource_id)
            } else {
                LibraryError::NotAuthorized
            });
        }

        self.tracker
            .start(&mut self.store, student_id, resource_id, now)
    }

    pub fn record_sample(
        &mut self,
        student_id: UserId,
        log_id: ActivityLogId,
        sample: ProgressSample,
        now: DateTime<Utc>,
    ) -> LibraryResult<SampleOutcome> {
        self.tracker
            .record_sample(&mut self.store, student_id, log_id, sample, now)
    }

    /// Leaves the reading view, finalizing the open session if there is one.
    pub fn close(
        &mut self,
        student_id: UserId,
        now: DateTime<Utc>,
    ) -> LibraryResult<Option<ActivityLog>> {
        self.tracker.finish(&mut self.store, student_id, now)
    }

    /// Finalizes `log_id` only while it is still the student's active session.
    ///
    /// A caller that opened `log_id` uses this to leave without ending a newer
    /// session started elsewhere.
    pub fn close_log(
        &mut self,
        student_id: UserId,
        log_id: ActivityLogId,
        now: DateTime<Utc>,
    ) -> LibraryResult<Option<ActivityLog>> {
        match self.tracker.active_session(student_id) {
            Some(session) if session.log_id == log_id => {
                self.tracker.finish(&mut self.store, student_id, now)
            }
            _ => Ok(None),
        }
    }

    //=====================================================================================
    // Catalog
    //=====================================================================================

    /// Adds a resource to the head of the catalog.
    ///
    /// Books always receive the placeholder text, whatever content was supplied.
    pub fn add_resource(&mut self, actor_id: UserId, draft: ResourceDraft) -> LibraryResult<Resource> {
        let actor = self.store.require_user(actor_id)?;
        if !can_perform(actor, Action::AddResource) {
            return Err(LibraryError::NotAuthorized);
        }
        validate_draft(&draft)?;

        let content = match draft.kind {
            ResourceType::Book => Some(PLACEHOLDER_CONTENT.to_string()),
            ResourceType::Audiobook => draft
                .content
                .filter(|c| !c.trim().is_empty())
                .or_else(|| Some(PLACEHOLDER_CONTENT.to_string())),
            ResourceType::Video | ResourceType::Audio => draft.content,
        };
        let (audio_url, video_url) = match draft.kind {
            ResourceType::Video => (None, draft.video_url),
            ResourceType::Audio | ResourceType::Audiobook => (draft.audio_url, None),
            ResourceType::Book => (None, None),
        };

        let resource = Resource {
            id: self.store.fresh_id(),
            kind: draft.kind,
            title: draft.title,
            author: draft.author,
            synopsis: draft.synopsis,
            cover_url: draft.cover_url,
            category: draft.category,
            borrowed_by: None,
            content,
            audio_url,
            video_url,
        };
        self.store.prepend_resource(resource.clone());
        info!(actor_id, resource_id = resource.id, kind = %resource.kind, "Resource added");
        Ok(resource)
    }
}

fn validate_draft(draft: &ResourceDraft) -> LibraryResult<()> {
    let required = [
        ("title", &draft.title),
        ("author", &draft.author),
        ("cover_url", &draft.cover_url),
        ("category", &draft.category),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(LibraryError::InvalidResource(format!("{} is required", field)));
    }

    let has = |url: &Option<String>| url.as_deref().is_some_and(|u| !u.trim().is_empty());
    match draft.kind {
        ResourceType::Video if !has(&draft.video_url) => Err(LibraryError::InvalidResource(
            "video resources need a video_url".to_string(),
        )),
        ResourceType::Audio | ResourceType::Audiobook if !has(&draft.audio_url) => {
            Err(LibraryError::InvalidResource(format!(
                "{} resources need an audio_url",
                draft.kind
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActivityStatus;
    use crate::tracker::TrackerState;

    fn draft(kind: ResourceType) -> ResourceDraft {
        ResourceDraft {
            kind,
            title: "Cem Anos de Solidão".to_string(),
            author: "Gabriel García Márquez".to_string(),
            synopsis: "A saga da família Buendía.".to_string(),
            cover_url: "https://picsum.photos/seed/solidao/300/400".to_string(),
            category: "Ficção".to_string(),
            content: Some("Muitos anos depois...".to_string()),
            audio_url: Some("https://example.com/solidao.mp3".to_string()),
            video_url: Some("https://example.com/solidao.mp4".to_string()),
        }
    }

    #[test]
    fn borrow_fuses_lending_and_opening() {
        let now = Utc::now();
        let mut library = Library::seeded(now);

        let log_id = library.borrow(2, 102, now).unwrap();

        assert_eq!(library.store().resource(2).unwrap().borrowed_by, Some(102));
        let session = library.tracker().active_session(102).unwrap();
        assert_eq!(session.log_id, log_id);
        assert_eq!(session.resource_id, 2);
    }

    #[test]
    fn borrow_refusals_leave_everything_untouched() {
        let now = Utc::now();
        let mut library = Library::seeded(now);
        let resources = library.store().resources().to_vec();
        let logs = library.store().activity_logs().to_vec();

        assert_eq!(library.borrow(3, 101, now), Err(LibraryError::AlreadyBorrowed(3)));
        assert_eq!(library.borrow(2, 1, now), Err(LibraryError::NotAuthorized));
        assert_eq!(library.borrow(2, 0, now), Err(LibraryError::NotAuthorized));
        assert!(matches!(library.borrow(42, 101, now), Err(LibraryError::NotFound(_))));
        assert!(matches!(library.borrow(2, 9999, now), Err(LibraryError::NotFound(_))));

        assert_eq!(library.store().resources(), resources.as_slice());
        assert_eq!(library.store().activity_logs(), logs.as_slice());
        assert_eq!(library.tracker().state(101), TrackerState::Idle);
    }

    #[test]
    fn only_the_holder_can_return() {
        let now = Utc::now();
        let mut library = Library::seeded(now);

        assert_eq!(library.return_resource(3, 101), Err(LibraryError::NotBorrower(3)));
        assert_eq!(library.return_resource(3, 2), Err(LibraryError::NotAuthorized));
        assert_eq!(library.store().resource(3).unwrap().borrowed_by, Some(103));

        library.return_resource(3, 103).unwrap();
        assert!(library.store().resource(3).unwrap().is_available());
    }

    #[test]
    fn open_requires_holding_the_resource() {
        let now = Utc::now();
        let mut library = Library::seeded(now);

        assert_eq!(library.open(2, 101, now), Err(LibraryError::NotBorrower(2)));
        assert_eq!(library.open(1, 1, now), Err(LibraryError::NotAuthorized));

        let log_id = library.open(1, 101, now).unwrap();
        assert_eq!(library.tracker().active_session(101).unwrap().log_id, log_id);
    }

    #[test]
    fn close_and_logout_finalize_the_session() {
        let now = Utc::now();
        let mut library = Library::seeded(now);

        let log_id = library.open(1, 101, now).unwrap();
        library
            .record_sample(101, log_id, ProgressSample::Media { position_secs: 99.0, duration_secs: Some(100.0) }, now)
            .unwrap();
        let log = library.close(101, now).unwrap().unwrap();
        assert_eq!(log.status, ActivityStatus::Completed);
        assert_eq!(library.close(101, now).unwrap(), None);

        let log_id = library.open(1, 101, now).unwrap();
        let log = library.logout(101, now).unwrap().unwrap();
        assert_eq!(log.id, log_id);
        assert_eq!(log.status, ActivityStatus::InProgress);
    }

    #[test]
    fn close_log_leaves_a_newer_session_running() {
        let now = Utc::now();
        let mut library = Library::seeded(now);

        let first = library.open(1, 101, now).unwrap();
        library.borrow(2, 101, now).unwrap();
        let second = library.tracker().active_session(101).unwrap().log_id;

        assert_eq!(library.close_log(101, first, now).unwrap(), None);
        assert!(library.store().activity_log(second).unwrap().is_open());
        assert_eq!(library.tracker().active_session(101).unwrap().log_id, second);

        let log = library.close_log(101, second, now).unwrap().unwrap();
        assert_eq!(log.id, second);
        assert_eq!(library.tracker().state(101), TrackerState::Finalized(second));
        assert_eq!(library.close_log(101, second, now).unwrap(), None);
    }

    #[test]
    fn books_always_get_placeholder_content() {
        let mut library = Library::seeded(Utc::now());
        let resource = library.add_resource(1, draft(ResourceType::Book)).unwrap();

        assert_eq!(resource.content.as_deref(), Some(PLACEHOLDER_CONTENT));
        assert_eq!(resource.borrowed_by, None);
        assert_eq!(resource.audio_url, None);
        assert_eq!(resource.video_url, None);
        assert_eq!(library.store().resources()[0].id, resource.id);
    }

    #[test]
    fn added_resources_get_fresh_ids() {
        let mut library = Library::seeded(Utc::now());
        let first = library.add_resource(0, draft(ResourceType::Video)).unwrap();
        let second = library.add_resource(0, draft(ResourceType::Audio)).unwrap();

        assert_ne!(first.id, second.id);
        assert!(library.store().users().iter().all(|u| u.id != first.id));
        assert_eq!(first.video_url.as_deref(), Some("https://example.com/solidao.mp4"));
        assert_eq!(first.audio_url, None);
        assert_eq!(second.audio_url.as_deref(), Some("https://example.com/solidao.mp3"));
    }

    #[test]
    fn audiobooks_without_text_get_the_placeholder() {
        let mut library = Library::seeded(Utc::now());
        let mut input = draft(ResourceType::Audiobook);
        input.content = None;

        let resource = library.add_resource(1, input).unwrap();
        assert_eq!(resource.content.as_deref(), Some(PLACEHOLDER_CONTENT));

        let resource = library.add_resource(1, draft(ResourceType::Audiobook)).unwrap();
        assert_eq!(resource.content.as_deref(), Some("Muitos anos depois..."));
    }

    #[test]
    fn add_resource_rejects_students_and_incomplete_drafts() {
        let mut library = Library::seeded(Utc::now());
        let count = library.store().resources().len();

        assert_eq!(
            library.add_resource(101, draft(ResourceType::Book)),
            Err(LibraryError::NotAuthorized)
        );

        let mut missing_title = draft(ResourceType::Book);
        missing_title.title = "  ".to_string();
        assert!(matches!(
            library.add_resource(1, missing_title),
            Err(LibraryError::InvalidResource(_))
        ));

        let mut missing_video = draft(ResourceType::Video);
        missing_video.video_url = None;
        assert!(matches!(
            library.add_resource(1, missing_video),
            Err(LibraryError::InvalidResource(_))
        ));

        let mut missing_audio = draft(ResourceType::Audiobook);
        missing_audio.audio_url = Some(String::new());
        assert!(matches!(
            library.add_resource(1, missing_audio),
            Err(LibraryError::InvalidResource(_))
        ));

        assert_eq!(library.store().resources().len(), count);
    }
}
