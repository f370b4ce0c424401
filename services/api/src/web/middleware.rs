//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::{AppState, AuthSession};

/// Reads the `session` cookie value from the request headers.
pub fn session_id_from(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty())
}

/// Middleware that validates the session cookie and resolves the logged-in user.
///
/// If valid, inserts an `AuthSession` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let session_id = session_id_from(req.headers())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    let user_id = state
        .session_user(&session_id)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user = state
        .library
        .lock()
        .await
        .store()
        .user(user_id)
        .cloned()
        .ok_or_else(|| {
            warn!(user_id, "Session refers to an unknown user");
            StatusCode::UNAUTHORIZED
        })?;

    req.extensions_mut().insert(AuthSession { session_id, user });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=pt"),
        );
        assert_eq!(session_id_from(&headers), Some("abc-123"));
    }

    #[test]
    fn missing_or_cleared_cookie_is_none() {
        assert_eq!(session_id_from(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_id_from(&headers), None);
    }
}
