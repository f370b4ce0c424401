//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-login session state.

use crate::config::Config;
use digital_library_core::{
    router::{Navigator, Transition, View},
    ActivityLogId, Library, ResourceId, SuggestionService, User, UserId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    /// Every library operation runs under this lock, so checks and writes are atomic.
    pub library: Arc<Mutex<Library>>,
    pub config: Arc<Config>,
    pub suggestion_adapter: Arc<dyn SuggestionService>,
    /// Login sessions keyed by the `session` cookie value.
    pub sessions: Mutex<HashMap<String, SessionContext>>,
}

//=========================================================================================
// SessionContext (Specific to One Login)
//=========================================================================================

/// The state kept for one logged-in browser.
#[derive(Debug)]
pub struct SessionContext {
    pub user_id: UserId,
    pub navigator: Navigator,
    /// Cancels the sampling task of the open reading view, if any.
    pub reading_token: Option<CancellationToken>,
    /// The activity log this login's reading view writes to.
    pub reading_log: Option<ActivityLogId>,
}

impl SessionContext {
    /// Moves into the reading view for `log_id`, stopping any earlier sampling task.
    pub fn start_reading(&mut self, resource_id: ResourceId, log_id: ActivityLogId) {
        self.stop_reading();
        self.navigator.navigate(View::Reading(resource_id));
        self.reading_log = Some(log_id);
    }

    /// Navigates to `view`. When that leaves the reading view, the sampling
    /// task stops and the log this login was writing to is handed back.
    pub fn navigate(&mut self, view: View) -> (Transition, Option<ActivityLogId>) {
        let transition = self.navigator.navigate(view);
        let log_id = match transition {
            Transition::LeftReading(_) => {
                self.stop_reading();
                self.reading_log.take()
            }
            Transition::Stayed | Transition::Moved => None,
        };
        (transition, log_id)
    }

    /// Stops the sampling task, if one is running.
    pub fn stop_reading(&mut self) {
        if let Some(token) = self.reading_token.take() {
            token.cancel();
        }
    }
}

/// What the auth middleware attaches to every protected request.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: String,
    pub user: User,
}

impl AppState {
    pub fn new(library: Library, config: Arc<Config>, suggestion_adapter: Arc<dyn SuggestionService>) -> Self {
        Self {
            library: Arc::new(Mutex::new(library)),
            config,
            suggestion_adapter,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Opens a login session for `user` and returns its id.
    pub async fn open_session(&self, user: &User) -> String {
        let session_id = Uuid::new_v4().to_string();
        let context = SessionContext {
            user_id: user.id,
            navigator: Navigator::after_login(user),
            reading_token: None,
            reading_log: None,
        };
        self.sessions.lock().await.insert(session_id.clone(), context);
        session_id
    }

    pub async fn session_user(&self, session_id: &str) -> Option<UserId> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .map(|context| context.user_id)
    }

    /// Whether `user_id` still has any login session open.
    pub async fn is_logged_in(&self, user_id: UserId) -> bool {
        self.sessions
            .lock()
            .await
            .values()
            .any(|context| context.user_id == user_id)
    }

    /// Removes a login session, stopping its sampling task.
    pub async fn close_session(&self, session_id: &str) -> Option<SessionContext> {
        let mut context = self.sessions.lock().await.remove(session_id)?;
        context.stop_reading();
        Some(context)
    }
}
