//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, and logout.

use crate::web::{
    middleware::session_id_from,
    rest::{reject, ViewResponse},
    state::AppState,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use digital_library_core::{router::Navigator, store::INSTITUTIONS, Role, User, UserDraft, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `student` or `teacher`.
    pub role: String,
    pub institution: String,
    /// Required for students.
    pub teacher_id: Option<UserId>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub institution: String,
    pub teacher_id: Option<UserId>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            institution: user.institution.clone(),
            teacher_id: user.teacher_id,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    /// Where the user lands after logging in.
    pub view: ViewResponse,
}

#[derive(Serialize, ToSchema)]
pub struct TeacherOption {
    pub id: UserId,
    pub name: String,
}

/// Choices offered by the registration form.
#[derive(Serialize, ToSchema)]
pub struct RegisterOptions {
    pub institutions: Vec<String>,
    pub teachers: Vec<TeacherOption>,
}

//=========================================================================================
// Handlers
//=========================================================================================

fn session_cookie(session_id: &str) -> String {
    format!(
        "session={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        session_id,
        Duration::days(30).num_seconds()
    )
}

/// Opens a login session for `user` and builds the response that sets its cookie.
async fn start_session(state: &AppState, user: User, status: StatusCode) -> impl IntoResponse {
    let session_id = state.open_session(&user).await;
    let response = AuthResponse {
        user: UserResponse::from(&user),
        view: ViewResponse::new(Navigator::after_login(&user).screen(&user), &user),
    };
    (
        status,
        [(header::SET_COOKIE, session_cookie(&session_id))],
        Json(response),
    )
}

/// POST /auth/register - Create a student or teacher account and log it in
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created and logged in", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Admins cannot self-register"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let role = req.role.parse::<Role>().map_err(reject)?;
    let draft = UserDraft {
        name: req.name,
        email: req.email,
        password: req.password,
        role,
        institution: req.institution,
        teacher_id: req.teacher_id,
    };

    let user = state.library.lock().await.register(draft).map_err(reject)?;
    info!(user_id = user.id, role = %user.role, "User registered");
    Ok(start_session(&state, user, StatusCode::CREATED).await)
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state
        .library
        .lock()
        .await
        .login(&req.email, &req.password)
        .map_err(reject)?;
    info!(user_id = user.id, "User logged in");
    Ok(start_session(&state, user, StatusCode::OK).await)
}

/// POST /auth/logout - Logout, finalizing any open reading session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session_id =
        session_id_from(&headers).ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    let context = state
        .close_session(session_id)
        .await
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    // The last login out ends whatever session is open; otherwise only the
    // session this login opened is ended.
    let other_logins = state.is_logged_in(context.user_id).await;
    {
        let mut library = state.library.lock().await;
        let ended = match (other_logins, context.reading_log) {
            (false, _) => library.logout(context.user_id, Utc::now()),
            (true, Some(log_id)) => library.close_log(context.user_id, log_id, Utc::now()),
            (true, None) => Ok(None),
        };
        ended.map_err(reject)?;
    }
    info!(user_id = context.user_id, "User logged out");

    let cookie = "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0";
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

/// GET /auth/register-options - Institutions and teachers for the registration form
#[utoipa::path(
    get,
    path = "/auth/register-options",
    responses((status = 200, description = "Registration choices", body = RegisterOptions))
)]
pub async fn register_options_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let library = state.library.lock().await;
    Json(RegisterOptions {
        institutions: INSTITUTIONS.iter().map(|i| i.to_string()).collect(),
        teachers: library
            .store()
            .teachers()
            .map(|t| TeacherOption {
                id: t.id,
                name: t.name.clone(),
            })
            .collect(),
    })
}
