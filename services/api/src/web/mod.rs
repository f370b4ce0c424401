pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod tracking_task;
pub mod ws_handler;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use middleware::require_auth;
pub use ws_handler::ws_handler;

use axum::{
    routing::{get, post},
    Router,
    middleware as axum_middleware,
};
use std::sync::Arc;
use state::AppState;

/// Builds the API router: public auth routes plus the cookie-protected rest.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/register-options", get(auth::register_options_handler))
        .route("/categories", get(rest::list_categories_handler))
        .route("/suggestions", get(rest::suggestions_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/resources",
            get(rest::list_resources_handler).post(rest::add_resource_handler),
        )
        .route("/resources/{id}/borrow", post(rest::borrow_handler))
        .route("/resources/{id}/return", post(rest::return_handler))
        .route("/resources/{id}/open", post(rest::open_handler))
        .route("/reading/close", post(rest::close_reading_handler))
        .route(
            "/view",
            get(rest::current_view_handler).post(rest::navigate_handler),
        )
        .route("/dashboard/teacher", get(rest::teacher_dashboard_handler))
        .route(
            "/dashboard/teacher/students/{id}",
            get(rest::student_activity_handler),
        )
        .route("/dashboard/admin", get(rest::admin_dashboard_handler))
        .route("/ws", get(ws_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
