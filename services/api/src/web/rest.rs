//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    auth::{self, AuthResponse, LoginRequest, RegisterOptions, RegisterRequest, TeacherOption, UserResponse},
    state::{AppState, AuthSession},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use digital_library_core::{
    catalog::{self, CatalogQuery},
    reports::{self, format_duration, ActivityEntry, AdminReport, StudentActivity, TeacherDashboard},
    router::{listed_resources, Capabilities, RoleView, Screen, Transition, View},
    suggestions::suggest_resources,
    ActivityLog, ActivityLogId, LibraryError, Resource, ResourceDraft, ResourceId, ResourceType,
    User, UserId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::register_options_handler,
        list_resources_handler,
        list_categories_handler,
        add_resource_handler,
        borrow_handler,
        return_handler,
        open_handler,
        close_reading_handler,
        current_view_handler,
        navigate_handler,
        teacher_dashboard_handler,
        student_activity_handler,
        admin_dashboard_handler,
        suggestions_handler,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, AuthResponse, UserResponse, RegisterOptions, TeacherOption,
            ResourceResponse, AddResourceRequest, SessionResponse, CloseResponse, ActivityLogResponse,
            ViewResponse, CapabilitiesResponse, NavigateRequest, ViewTarget,
            TeacherDashboardResponse, StudentActivityResponse, ActivityEntryResponse,
            AdminReportResponse, DailyReadingResponse, StudentTimeResponse,
        )
    ),
    tags(
        (name = "Digital Library API", description = "Catalog, lending and reading-activity endpoints for the school library.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps a refused library operation onto an HTTP status and message.
pub fn reject(err: LibraryError) -> (StatusCode, String) {
    let status = match &err {
        LibraryError::NotFound(_) => StatusCode::NOT_FOUND,
        LibraryError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        LibraryError::NotAuthorized | LibraryError::NotBorrower(_) => StatusCode::FORBIDDEN,
        LibraryError::AlreadyBorrowed(_)
        | LibraryError::EmailTaken(_)
        | LibraryError::NoActiveSession(_)
        | LibraryError::StaleSession(_)
        | LibraryError::SessionFinalized(_) => StatusCode::CONFLICT,
        LibraryError::UnknownTeacher(_)
        | LibraryError::InvalidResource(_)
        | LibraryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
    };
    warn!(status = %status, error = %err, "Request refused");
    (status, err.to_string())
}

fn session_gone() -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, "Session expired".to_string())
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct ResourceResponse {
    pub id: ResourceId,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub author: String,
    pub synopsis: String,
    pub cover_url: String,
    pub category: String,
    pub borrowed_by: Option<UserId>,
    pub content: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
}

impl From<&Resource> for ResourceResponse {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id,
            kind: resource.kind.as_str().to_string(),
            title: resource.title.clone(),
            author: resource.author.clone(),
            synopsis: resource.synopsis.clone(),
            cover_url: resource.cover_url.clone(),
            category: resource.category.clone(),
            borrowed_by: resource.borrowed_by,
            content: resource.content.clone(),
            audio_url: resource.audio_url.clone(),
            video_url: resource.video_url.clone(),
        }
    }
}

/// The catalog form. `type` is one of `book`, `video`, `audio`, `audiobook`.
#[derive(Deserialize, ToSchema)]
pub struct AddResourceRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub synopsis: String,
    pub cover_url: String,
    pub category: String,
    pub content: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
}

impl AddResourceRequest {
    fn into_draft(self) -> Result<ResourceDraft, LibraryError> {
        Ok(ResourceDraft {
            kind: self.kind.parse::<ResourceType>()?,
            title: self.title,
            author: self.author,
            synopsis: self.synopsis,
            cover_url: self.cover_url,
            category: self.category,
            content: self.content,
            audio_url: self.audio_url,
            video_url: self.video_url,
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct ActivityLogResponse {
    pub id: ActivityLogId,
    pub student_id: UserId,
    pub resource_id: ResourceId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: u64,
    /// Human readable duration, e.g. `3 min 5 s`.
    pub duration_label: String,
    pub progress: f64,
    pub status: String,
}

impl From<&ActivityLog> for ActivityLogResponse {
    fn from(log: &ActivityLog) -> Self {
        Self {
            id: log.id,
            student_id: log.student_id,
            resource_id: log.resource_id,
            start_time: log.start_time,
            end_time: log.end_time,
            duration_seconds: log.duration_seconds,
            duration_label: format_duration(log.duration_seconds),
            progress: log.progress,
            status: log.status.as_str().to_string(),
        }
    }
}

/// Sent after a borrow or open: the reading view is entered and a session is open.
#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub log_id: ActivityLogId,
    pub resource: ResourceResponse,
}

#[derive(Serialize, ToSchema)]
pub struct CloseResponse {
    /// The finalized log, or null if no session was open.
    pub log: Option<ActivityLogResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct CapabilitiesResponse {
    pub browse_library: bool,
    pub my_resources: bool,
    pub borrow: bool,
    pub add_resource: bool,
    pub teacher_dashboard: bool,
    pub admin_dashboard: bool,
}

impl From<Capabilities> for CapabilitiesResponse {
    fn from(c: Capabilities) -> Self {
        Self {
            browse_library: c.browse_library,
            my_resources: c.my_resources,
            borrow: c.borrow,
            add_resource: c.add_resource,
            teacher_dashboard: c.teacher_dashboard,
            admin_dashboard: c.admin_dashboard,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ViewResponse {
    /// One of `library`, `my_resources`, `reading`, `admin_dashboard`, `teacher_dashboard`.
    pub screen: String,
    pub resource_id: Option<ResourceId>,
    pub capabilities: CapabilitiesResponse,
}

impl ViewResponse {
    pub fn new(screen: Screen, user: &User) -> Self {
        let (name, resource_id) = match screen {
            Screen::Library => ("library", None),
            Screen::MyResources => ("my_resources", None),
            Screen::Reading(id) => ("reading", Some(id)),
            Screen::AdminDashboard => ("admin_dashboard", None),
            Screen::TeacherDashboard => ("teacher_dashboard", None),
        };
        Self {
            screen: name.to_string(),
            resource_id,
            capabilities: RoleView::for_user(user).capabilities().into(),
        }
    }
}

/// Views reachable by navigation. Reading is entered through borrow or open.
#[derive(Deserialize, ToSchema, Debug, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ViewTarget {
    Library,
    MyResources,
    AdminDashboard,
}

#[derive(Deserialize, ToSchema)]
pub struct NavigateRequest {
    pub view: ViewTarget,
}

#[derive(Serialize, ToSchema)]
pub struct ActivityEntryResponse {
    pub resource_title: String,
    pub log: ActivityLogResponse,
}

impl From<&ActivityEntry> for ActivityEntryResponse {
    fn from(entry: &ActivityEntry) -> Self {
        Self {
            resource_title: entry.resource_title.clone(),
            log: (&entry.log).into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StudentActivityResponse {
    pub student_id: UserId,
    pub student_name: String,
    pub student_email: String,
    pub entries: Vec<ActivityEntryResponse>,
}

impl From<&StudentActivity> for StudentActivityResponse {
    fn from(activity: &StudentActivity) -> Self {
        Self {
            student_id: activity.student_id,
            student_name: activity.student_name.clone(),
            student_email: activity.student_email.clone(),
            entries: activity.entries.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TeacherDashboardResponse {
    pub teacher_id: UserId,
    pub students: Vec<StudentActivityResponse>,
}

impl From<&TeacherDashboard> for TeacherDashboardResponse {
    fn from(dashboard: &TeacherDashboard) -> Self {
        Self {
            teacher_id: dashboard.teacher_id,
            students: dashboard.students.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DailyReadingResponse {
    /// Three-letter weekday, e.g. `Mon`.
    pub day: String,
    pub completed_sessions: usize,
}

#[derive(Serialize, ToSchema)]
pub struct StudentTimeResponse {
    pub student_id: UserId,
    pub student_name: String,
    pub minutes: u64,
}

#[derive(Serialize, ToSchema)]
pub struct AdminReportResponse {
    pub total_users: usize,
    pub students: usize,
    pub teachers: usize,
    pub admins: usize,
    pub total_resources: usize,
    pub borrowed_resources: usize,
    pub weekly_reading: Vec<DailyReadingResponse>,
    pub completed_this_week: usize,
    pub time_per_student: Vec<StudentTimeResponse>,
    pub average_minutes: f64,
}

impl From<AdminReport> for AdminReportResponse {
    fn from(report: AdminReport) -> Self {
        Self {
            total_users: report.total_users,
            students: report.students,
            teachers: report.teachers,
            admins: report.admins,
            total_resources: report.total_resources,
            borrowed_resources: report.borrowed_resources,
            weekly_reading: report
                .weekly_reading
                .into_iter()
                .map(|d| DailyReadingResponse {
                    day: d.day.to_string(),
                    completed_sessions: d.completed_sessions,
                })
                .collect(),
            completed_this_week: report.completed_this_week,
            time_per_student: report
                .time_per_student
                .into_iter()
                .map(|s| StudentTimeResponse {
                    student_id: s.student_id,
                    student_name: s.student_name,
                    minutes: s.minutes,
                })
                .collect(),
            average_minutes: report.average_minutes,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogParams {
    /// Exact category; empty or `Todos` selects everything.
    pub category: Option<String>,
    /// Case-insensitive search over title and author.
    pub q: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestionParams {
    pub q: String,
}

//=========================================================================================
// Reading Session Helpers
//=========================================================================================

/// Puts the login session in the reading view for `log_id`.
async fn enter_reading(
    state: &AppState,
    session_id: &str,
    resource_id: ResourceId,
    log_id: ActivityLogId,
) {
    if let Some(context) = state.sessions.lock().await.get_mut(session_id) {
        context.start_reading(resource_id, log_id);
    }
}

/// Applies a navigation; leaving the reading view finalizes the log this
/// login opened, unless a newer session has already replaced it.
pub async fn navigate_session(
    state: &AppState,
    session_id: &str,
    user_id: UserId,
    view: View,
) -> Result<Option<ActivityLog>, (StatusCode, String)> {
    let (transition, log_id) = state
        .sessions
        .lock()
        .await
        .get_mut(session_id)
        .ok_or_else(session_gone)?
        .navigate(view);

    match (transition, log_id) {
        (Transition::LeftReading(resource_id), Some(log_id)) => {
            let log = state
                .library
                .lock()
                .await
                .close_log(user_id, log_id, Utc::now())
                .map_err(reject)?;
            info!(user_id, resource_id, log_id, "Left the reading view");
            Ok(log)
        }
        _ => Ok(None),
    }
}

/// Takes a login out of the reading view a WebSocket opened for `log_id`.
///
/// Nothing changes if `token` was cancelled: another request has already moved
/// this login elsewhere. Returns the log as it stands afterwards.
pub async fn leave_reading(
    state: &AppState,
    session_id: &str,
    user_id: UserId,
    log_id: ActivityLogId,
    token: &CancellationToken,
) -> Result<Option<ActivityLog>, (StatusCode, String)> {
    let left = {
        let mut sessions = state.sessions.lock().await;
        match sessions.get_mut(session_id) {
            Some(context) if context.reading_log == Some(log_id) && !token.is_cancelled() => {
                context.navigate(View::Library).1.is_some()
            }
            _ => false,
        }
    };

    let mut library = state.library.lock().await;
    if left {
        library.close_log(user_id, log_id, Utc::now()).map_err(reject)?;
        info!(user_id, log_id, "Left the reading view");
    }
    Ok(library.store().activity_log(log_id).cloned())
}

//=========================================================================================
// Catalog Handlers
//=========================================================================================

/// List the resources of the current catalog screen.
///
/// Students on "my resources" see what they hold; everyone else sees the whole catalog.
#[utoipa::path(
    get,
    path = "/resources",
    params(CatalogParams),
    responses(
        (status = 200, description = "Filtered resources", body = [ResourceResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_resources_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Query(params): Query<CatalogParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let screen = {
        let sessions = state.sessions.lock().await;
        let context = sessions.get(&auth.session_id).ok_or_else(session_gone)?;
        match context.navigator.screen(&auth.user) {
            Screen::MyResources => Screen::MyResources,
            _ => Screen::Library,
        }
    };

    let library = state.library.lock().await;
    let query = CatalogQuery::new(params.category.as_deref(), params.q.as_deref());
    let resources: Vec<ResourceResponse> = query
        .apply(listed_resources(library.store(), &auth.user, screen))
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(resources))
}

/// List the category selector entries, `Todos` first.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Categories", body = [String]))
)]
pub async fn list_categories_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let library = state.library.lock().await;
    Json(catalog::categories(library.store().resources()))
}

/// Add a resource to the head of the catalog (teachers and admins).
#[utoipa::path(
    post,
    path = "/resources",
    request_body = AddResourceRequest,
    responses(
        (status = 201, description = "Resource added", body = ResourceResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Not allowed to add resources")
    )
)]
pub async fn add_resource_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<AddResourceRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = req.into_draft().map_err(reject)?;
    let resource = state
        .library
        .lock()
        .await
        .add_resource(auth.user.id, draft)
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(ResourceResponse::from(&resource))))
}

//=========================================================================================
// Lending Handlers
//=========================================================================================

/// Borrow a resource and start reading it.
#[utoipa::path(
    post,
    path = "/resources/{id}/borrow",
    params(("id" = i64, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Borrowed; a reading session is open", body = SessionResponse),
        (status = 403, description = "Only students borrow"),
        (status = 404, description = "Unknown resource"),
        (status = 409, description = "Already borrowed")
    )
)]
pub async fn borrow_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let response = {
        let mut library = state.library.lock().await;
        let log_id = library
            .borrow(resource_id, auth.user.id, Utc::now())
            .map_err(reject)?;
        let resource = library.store().require_resource(resource_id).map_err(reject)?;
        SessionResponse {
            log_id,
            resource: resource.into(),
        }
    };
    enter_reading(&state, &auth.session_id, resource_id, response.log_id).await;
    Ok(Json(response))
}

/// Give a borrowed resource back.
#[utoipa::path(
    post,
    path = "/resources/{id}/return",
    params(("id" = i64, Path, description = "Resource id")),
    responses(
        (status = 204, description = "Returned"),
        (status = 403, description = "Not the borrower"),
        (status = 404, description = "Unknown resource")
    )
)]
pub async fn return_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .library
        .lock()
        .await
        .return_resource(resource_id, auth.user.id)
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Open a held resource in the reading view.
#[utoipa::path(
    post,
    path = "/resources/{id}/open",
    params(("id" = i64, Path, description = "Resource id")),
    responses(
        (status = 200, description = "A reading session is open", body = SessionResponse),
        (status = 403, description = "Resource not held by the caller"),
        (status = 404, description = "Unknown resource")
    )
)]
pub async fn open_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Path(resource_id): Path<ResourceId>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let response = {
        let mut library = state.library.lock().await;
        let log_id = library
            .open(resource_id, auth.user.id, Utc::now())
            .map_err(reject)?;
        let resource = library.store().require_resource(resource_id).map_err(reject)?;
        SessionResponse {
            log_id,
            resource: resource.into(),
        }
    };
    enter_reading(&state, &auth.session_id, resource_id, response.log_id).await;
    Ok(Json(response))
}

/// Leave the reading view, finalizing the open session.
#[utoipa::path(
    post,
    path = "/reading/close",
    responses((status = 200, description = "Session finalized (if any)", body = CloseResponse))
)]
pub async fn close_reading_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let log = navigate_session(&state, &auth.session_id, auth.user.id, View::Library).await?;
    Ok(Json(CloseResponse {
        log: log.as_ref().map(Into::into),
    }))
}

//=========================================================================================
// Navigation Handlers
//=========================================================================================

/// The screen the caller currently sees.
#[utoipa::path(
    get,
    path = "/view",
    responses((status = 200, description = "Resolved screen", body = ViewResponse))
)]
pub async fn current_view_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let sessions = state.sessions.lock().await;
    let context = sessions.get(&auth.session_id).ok_or_else(session_gone)?;
    Ok(Json(ViewResponse::new(context.navigator.screen(&auth.user), &auth.user)))
}

/// Navigate to another view.
#[utoipa::path(
    post,
    path = "/view",
    request_body = NavigateRequest,
    responses((status = 200, description = "Resolved screen after navigating", body = ViewResponse))
)]
pub async fn navigate_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<NavigateRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let view = match req.view {
        ViewTarget::Library => View::Library,
        ViewTarget::MyResources => View::MyResources,
        ViewTarget::AdminDashboard => View::AdminDashboard,
    };
    navigate_session(&state, &auth.session_id, auth.user.id, view).await?;

    let sessions = state.sessions.lock().await;
    let context = sessions.get(&auth.session_id).ok_or_else(session_gone)?;
    Ok(Json(ViewResponse::new(context.navigator.screen(&auth.user), &auth.user)))
}

//=========================================================================================
// Dashboard Handlers
//=========================================================================================

/// The caller's students and their reading sessions (teachers only).
#[utoipa::path(
    get,
    path = "/dashboard/teacher",
    responses(
        (status = 200, description = "Assigned students with their sessions", body = TeacherDashboardResponse),
        (status = 403, description = "Not a teacher")
    )
)]
pub async fn teacher_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let library = state.library.lock().await;
    let dashboard = reports::teacher_dashboard(library.store(), &auth.user).map_err(reject)?;
    Ok(Json(TeacherDashboardResponse::from(&dashboard)))
}

/// One assigned student's sessions, newest first (teachers only).
#[utoipa::path(
    get,
    path = "/dashboard/teacher/students/{id}",
    params(("id" = i64, Path, description = "Student id")),
    responses(
        (status = 200, description = "The student's sessions", body = StudentActivityResponse),
        (status = 403, description = "Not this student's teacher"),
        (status = 404, description = "Unknown student")
    )
)]
pub async fn student_activity_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Path(student_id): Path<UserId>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let library = state.library.lock().await;
    let activity =
        reports::student_activity_for(library.store(), &auth.user, student_id).map_err(reject)?;
    Ok(Json(StudentActivityResponse::from(&activity)))
}

/// Aggregate usage report (admins only).
#[utoipa::path(
    get,
    path = "/dashboard/admin",
    responses(
        (status = 200, description = "Usage report", body = AdminReportResponse),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn admin_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let library = state.library.lock().await;
    let report = reports::admin_report(library.store(), &auth.user, Utc::now()).map_err(reject)?;
    Ok(Json(AdminReportResponse::from(report)))
}

//=========================================================================================
// Suggestions
//=========================================================================================

/// Up to three AI-suggested books for a query. Never fails: errors yield a fixed list.
#[utoipa::path(
    get,
    path = "/suggestions",
    params(SuggestionParams),
    responses((status = 200, description = "Suggested resources", body = [ResourceResponse]))
)]
pub async fn suggestions_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestionParams>,
) -> impl IntoResponse {
    let resources = suggest_resources(state.suggestion_adapter.as_ref(), &params.q).await;
    let response: Vec<ResourceResponse> = resources.iter().map(Into::into).collect();
    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_errors_map_to_statuses() {
        assert_eq!(reject(LibraryError::AlreadyBorrowed(3)).0, StatusCode::CONFLICT);
        assert_eq!(reject(LibraryError::NotBorrower(3)).0, StatusCode::FORBIDDEN);
        assert_eq!(reject(LibraryError::NotAuthorized).0, StatusCode::FORBIDDEN);
        assert_eq!(reject(LibraryError::InvalidCredentials).0, StatusCode::UNAUTHORIZED);
        assert_eq!(reject(LibraryError::EmailTaken("a@b.c".into())).0, StatusCode::CONFLICT);
        assert_eq!(reject(LibraryError::NotFound("resource 9".into())).0, StatusCode::NOT_FOUND);
        assert_eq!(reject(LibraryError::InvalidResource("title".into())).0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_resource_types_are_bad_requests() {
        let req = AddResourceRequest {
            kind: "podcast".to_string(),
            title: "T".to_string(),
            author: "A".to_string(),
            synopsis: String::new(),
            cover_url: "https://picsum.photos/seed/t/300/400".to_string(),
            category: "Ciência".to_string(),
            content: None,
            audio_url: None,
            video_url: None,
        };
        let err = req.into_draft().unwrap_err();
        assert_eq!(reject(err).0, StatusCode::BAD_REQUEST);
    }
}
