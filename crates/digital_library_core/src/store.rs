//! crates/digital_library_core/src/store.rs
//!
//! The in-memory entity store. It is the sole owner of the user, resource and
//! activity-log collections; every other component borrows it.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    ActivityLog, ActivityLogId, ActivityStatus, Resource, ResourceId, ResourceType, Role, User,
    UserDraft, UserId,
};
use crate::error::{LibraryError, LibraryResult};

/// Text given to every book added through the catalog form.
pub const PLACEHOLDER_CONTENT: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed non risus. Suspendisse lectus tortor, dignissim sit amet, adipiscing nec, ultricies sed, dolor. Cras elementum ultrices diam. Maecenas ligula massa, varius a, semper congue, euismod non, mi. Proin porttitor, orci nec nonummy molestie, enim est eleifend mi, non fermentum diam nisl sit amet erat. Duis semper. Duis arcu massa, scelerisque vitae, consequat in, pretium a, enim. Pellentesque congue. Ut in risus volutpat libero pharetra tempor. Cras vestibulum bibendum augue. Praesent egestas leo in pede. Praesent blandit odio eu enim. Pellentesque sed dui ut augue blandit sodales. Vestibulum ante ipsum primis in faucibus orci luctus et ultrices posuere cubilia Curae; Aliquam nibh. Mauris ac mauris sed pede pellentesque fermentum. Maecenas adipiscing ante non diam. Proin sed quam quis magna varius pulvinar. Nullam sapien sem, ornare ac, nonummy non, lobortis a, enim.";

/// Institutions offered on the registration form.
pub const INSTITUTIONS: [&str; 3] = ["Escola Modelo", "Colégio Alpha", "Instituto Beta"];

#[derive(Debug, Clone)]
pub struct EntityStore {
    users: Vec<User>,
    resources: Vec<Resource>,
    activity_logs: Vec<ActivityLog>,
    next_id: i64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            resources: Vec::new(),
            activity_logs: Vec::new(),
            next_id: 1,
        }
    }

    /// Creates a store holding the demo school: one admin, two teachers, three
    /// students, six resources and two past sessions.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut store = Self::new();
        for user in seed_users() {
            store.reserve_id(user.id);
            store.users.push(user);
        }
        for resource in seed_resources() {
            store.reserve_id(resource.id);
            store.resources.push(resource);
        }
        for log in seed_activity_logs(now) {
            store.reserve_id(log.id);
            store.activity_logs.push(log);
        }
        store
    }

    /// Hands out an id no entity in the store has used.
    pub(crate) fn fresh_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn reserve_id(&mut self, id: i64) {
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }

    //=====================================================================================
    // Users
    //=====================================================================================

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    /// Looks up a user or reports which id was missing.
    pub fn require_user(&self, id: UserId) -> LibraryResult<&User> {
        self.user(id)
            .ok_or_else(|| LibraryError::NotFound(format!("User {} not found", id)))
    }

    pub fn teachers(&self) -> impl Iterator<Item = &User> {
        self.users.iter().filter(|u| u.role == Role::Teacher)
    }

    /// Students assigned to the given teacher.
    pub fn students_of(&self, teacher_id: UserId) -> impl Iterator<Item = &User> {
        self.users
            .iter()
            .filter(move |u| u.role == Role::Student && u.teacher_id == Some(teacher_id))
    }

    /// Loads an existing user record with its id already set.
    ///
    /// Fails if the id or the email is already taken.
    pub fn insert_user(&mut self, user: User) -> LibraryResult<()> {
        if self.user(user.id).is_some() {
            return Err(LibraryError::InvalidInput(format!("user id {} is taken", user.id)));
        }
        if self.user_by_email(&user.email).is_some() {
            return Err(LibraryError::EmailTaken(user.email));
        }
        self.reserve_id(user.id);
        self.users.push(user);
        Ok(())
    }

    /// Inserts a new user under a fresh id.
    pub fn create_user(&mut self, draft: UserDraft) -> User {
        let user = User {
            id: self.fresh_id(),
            name: draft.name,
            email: draft.email,
            password: draft.password,
            role: draft.role,
            institution: draft.institution,
            teacher_id: draft.teacher_id,
        };
        self.users.push(user.clone());
        user
    }

    //=====================================================================================
    // Resources
    //=====================================================================================

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn require_resource(&self, id: ResourceId) -> LibraryResult<&Resource> {
        self.resource(id)
            .ok_or_else(|| LibraryError::NotFound(format!("Resource {} not found", id)))
    }

    /// Appends an existing resource record with its id already set.
    ///
    /// The resource must be on the shelf: lending only happens through
    /// `Library::borrow`, which also opens the holder's session.
    pub fn insert_resource(&mut self, resource: Resource) -> LibraryResult<()> {
        if self.resource(resource.id).is_some() {
            return Err(LibraryError::InvalidResource(format!(
                "resource id {} is taken",
                resource.id
            )));
        }
        if resource.borrowed_by.is_some() {
            return Err(LibraryError::InvalidResource(format!(
                "resource {} cannot be loaded as borrowed",
                resource.id
            )));
        }
        self.reserve_id(resource.id);
        self.resources.push(resource);
        Ok(())
    }

    /// Puts a resource at the head of the catalog.
    pub(crate) fn prepend_resource(&mut self, resource: Resource) {
        self.reserve_id(resource.id);
        self.resources.insert(0, resource);
    }

    pub(crate) fn set_borrowed_by(
        &mut self,
        resource_id: ResourceId,
        holder: Option<UserId>,
    ) -> LibraryResult<()> {
        let resource = self
            .resources
            .iter_mut()
            .find(|r| r.id == resource_id)
            .ok_or_else(|| LibraryError::NotFound(format!("Resource {} not found", resource_id)))?;
        resource.borrowed_by = holder;
        Ok(())
    }

    /// Resources currently held by a student.
    pub fn borrowed_by(&self, student_id: UserId) -> impl Iterator<Item = &Resource> {
        self.resources
            .iter()
            .filter(move |r| r.borrowed_by == Some(student_id))
    }

    //=====================================================================================
    // Activity logs
    //=====================================================================================

    pub fn activity_logs(&self) -> &[ActivityLog] {
        &self.activity_logs
    }

    pub fn activity_log(&self, id: ActivityLogId) -> Option<&ActivityLog> {
        self.activity_logs.iter().find(|l| l.id == id)
    }

    pub fn logs_for_student(&self, student_id: UserId) -> impl Iterator<Item = &ActivityLog> {
        self.activity_logs
            .iter()
            .filter(move |l| l.student_id == student_id)
    }

    /// Loads a past session. Its resource may since have left the catalog,
    /// but its student must exist.
    pub fn insert_activity_log(&mut self, log: ActivityLog) -> LibraryResult<()> {
        if self.activity_log(log.id).is_some() {
            return Err(LibraryError::InvalidInput(format!(
                "activity log id {} is taken",
                log.id
            )));
        }
        self.require_user(log.student_id)?;
        self.reserve_id(log.id);
        self.activity_logs.push(log);
        Ok(())
    }

    /// Opens a new in-progress log starting at `now`.
    pub(crate) fn create_activity_log(
        &mut self,
        student_id: UserId,
        resource_id: ResourceId,
        now: DateTime<Utc>,
    ) -> ActivityLogId {
        let id = self.fresh_id();
        self.activity_logs.push(ActivityLog {
            id,
            student_id,
            resource_id,
            start_time: now,
            end_time: None,
            duration_seconds: 0,
            progress: 0.0,
            status: ActivityStatus::InProgress,
        });
        id
    }

    fn open_log_mut(&mut self, id: ActivityLogId) -> LibraryResult<&mut ActivityLog> {
        let log = self
            .activity_logs
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| LibraryError::NotFound(format!("Activity log {} not found", id)))?;
        if !log.is_open() {
            return Err(LibraryError::SessionFinalized(id));
        }
        Ok(log)
    }

    /// Overwrites the measured progress of an open log.
    pub(crate) fn update_log_progress(
        &mut self,
        id: ActivityLogId,
        progress: f64,
        duration_seconds: u64,
    ) -> LibraryResult<()> {
        let log = self.open_log_mut(id)?;
        log.progress = progress;
        log.duration_seconds = duration_seconds;
        Ok(())
    }

    /// Closes a log at `now`, deciding its final status from the last progress.
    pub(crate) fn finalize_log(
        &mut self,
        id: ActivityLogId,
        now: DateTime<Utc>,
    ) -> LibraryResult<ActivityLog> {
        let log = self.open_log_mut(id)?;
        log.end_time = Some(now);
        log.status = ActivityStatus::for_progress(log.progress);
        Ok(log.clone())
    }
}

//=========================================================================================
// Demo data
//=========================================================================================

fn seed_user(
    id: UserId,
    name: &str,
    email: &str,
    role: Role,
    teacher_id: Option<UserId>,
) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        password: "123".to_string(),
        role,
        institution: INSTITUTIONS[0].to_string(),
        teacher_id,
    }
}

fn seed_users() -> Vec<User> {
    vec![
        seed_user(0, "Admin Geral", "admin@escola.com", Role::Admin, None),
        seed_user(1, "Prof. Ana Silva", "ana@escola.com", Role::Teacher, None),
        seed_user(2, "Prof. Carlos Lima", "carlos@escola.com", Role::Teacher, None),
        seed_user(101, "João Pereira", "joao@aluno.com", Role::Student, Some(1)),
        seed_user(102, "Maria Costa", "maria@aluno.com", Role::Student, Some(1)),
        seed_user(103, "Pedro Alves", "pedro@aluno.com", Role::Student, Some(2)),
    ]
}

#[allow(clippy::too_many_arguments)]
fn seed_resource(
    id: ResourceId,
    kind: ResourceType,
    title: &str,
    author: &str,
    synopsis: &str,
    cover_seed: &str,
    category: &str,
    borrowed_by: Option<UserId>,
) -> Resource {
    let content = matches!(kind, ResourceType::Book | ResourceType::Audiobook)
        .then(|| PLACEHOLDER_CONTENT.to_string());
    Resource {
        id,
        kind,
        title: title.to_string(),
        author: author.to_string(),
        synopsis: synopsis.to_string(),
        cover_url: format!("https://picsum.photos/seed/{}/300/400", cover_seed),
        category: category.to_string(),
        borrowed_by,
        content,
        audio_url: None,
        video_url: None,
    }
}

fn seed_resources() -> Vec<Resource> {
    let mut hitchhiker = seed_resource(
        1,
        ResourceType::Audiobook,
        "O Guia do Mochileiro das Galáxias",
        "Douglas Adams",
        "A saga de Arthur Dent após a destruição da Terra.",
        "mochileiro",
        "Ficção Científica",
        Some(101),
    );
    hitchhiker.audio_url =
        Some("https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3".to_string());

    let animal_farm = seed_resource(
        2,
        ResourceType::Book,
        "A Revolução dos Bichos",
        "George Orwell",
        "Uma sátira sobre a Revolução Russa em uma fazenda.",
        "revolucao",
        "Ficção",
        None,
    );

    let dune = seed_resource(
        3,
        ResourceType::Book,
        "Duna",
        "Frank Herbert",
        "Casas nobres lutam pelo controle do planeta deserto Arrakis.",
        "duna",
        "Ficção Científica",
        Some(103),
    );

    let mut cosmos = seed_resource(
        4,
        ResourceType::Video,
        "Documentário: Cosmos",
        "Carl Sagan",
        "Uma viagem pelo universo e pela história da ciência.",
        "cosmos",
        "Ciência",
        None,
    );
    cosmos.video_url = Some(
        "http://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4"
            .to_string(),
    );

    let mut habit = seed_resource(
        5,
        ResourceType::Audio,
        "Palestra: O Poder do Hábito",
        "Charles Duhigg",
        "Uma análise sobre como os hábitos são formados.",
        "habito",
        "Não-Ficção",
        None,
    );
    habit.audio_url =
        Some("https://www.soundhelix.com/examples/mp3/SoundHelix-Song-8.mp3".to_string());

    let mut potter = seed_resource(
        6,
        ResourceType::Audiobook,
        "Harry Potter e a Pedra Filosofal",
        "J.K. Rowling",
        "O início das aventuras do jovem bruxo Harry Potter.",
        "potter",
        "Fantasia",
        None,
    );
    potter.audio_url =
        Some("https://www.soundhelix.com/examples/mp3/SoundHelix-Song-3.mp3".to_string());

    vec![hitchhiker, animal_farm, dune, cosmos, habit, potter]
}

fn seed_activity_logs(now: DateTime<Utc>) -> Vec<ActivityLog> {
    let two_days_ago = now - Duration::days(2);
    let yesterday = now - Duration::days(1);
    vec![
        ActivityLog {
            id: 1,
            student_id: 101,
            resource_id: 1,
            start_time: two_days_ago,
            end_time: Some(two_days_ago + Duration::seconds(1234)),
            duration_seconds: 1234,
            progress: 85.0,
            status: ActivityStatus::Completed,
        },
        ActivityLog {
            id: 2,
            student_id: 103,
            resource_id: 3,
            start_time: yesterday,
            end_time: Some(yesterday + Duration::seconds(567)),
            duration_seconds: 567,
            progress: 40.0,
            status: ActivityStatus::InProgress,
        },
    ]
}
