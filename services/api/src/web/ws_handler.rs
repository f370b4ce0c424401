//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a reading-view WebSocket.
//! It opens (or attaches to) the student's tracking session, feeds client samples
//! to the sampling task and finalizes the session when the student leaves.

use crate::{
    error::ApiError,
    web::{
        protocol::{ClientMessage, ServerMessage},
        rest::leave_reading,
        state::{AppState, AuthSession},
        tracking_task::tracking_process,
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use chrono::Utc;
use digital_library_core::{
    ActivityLog, ActivityLogId, ActivityStatus, LibraryResult, ProgressSample, ResourceId,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How the reading loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// The student pressed back.
    Back,
    /// The socket closed without a back message.
    Disconnected,
    /// Someone else ended the session (close endpoint, logout, a newer session).
    EndedElsewhere,
}

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, auth))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, auth: AuthSession) {
    info!(user_id = auth.user.id, "New WebSocket connection established");
    if let Err(e) = run_reading_session(socket, &app_state, &auth).await {
        error!(user_id = auth.user.id, error = %e, "Reading session failed");
    }
    info!(user_id = auth.user.id, "WebSocket connection closed.");
}

async fn send(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), ApiError> {
    let json = serde_json::to_string(message).map_err(|e| ApiError::Internal(e.to_string()))?;
    sender.send(Message::Text(json.into())).await?;
    Ok(())
}

async fn run_reading_session(
    socket: WebSocket,
    app_state: &Arc<AppState>,
    auth: &AuthSession,
) -> Result<(), ApiError> {
    let user_id = auth.user.id;
    let (mut sender, mut receiver) = socket.split();

    // --- 1. Initialization Phase ---
    let resource_id = match receiver.next().await {
        Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Init { resource_id }) => resource_id,
            _ => {
                warn!(user_id, "First message was not a valid Init message.");
                let message = ServerMessage::Error {
                    message: "The first message must be init.".to_string(),
                };
                return send(&mut sender, &message).await;
            }
        },
        _ => {
            info!(user_id, "Client disconnected before sending Init message.");
            return Ok(());
        }
    };

    let token = CancellationToken::new();
    let log_id = match attach(app_state, auth, resource_id, token.clone()).await {
        Ok(log_id) => log_id,
        Err(e) => {
            warn!(user_id, resource_id, error = %e, "Could not open reading session");
            let message = ServerMessage::Error {
                message: e.to_string(),
            };
            return send(&mut sender, &message).await;
        }
    };
    send(&mut sender, &ServerMessage::SessionStarted { log_id }).await?;

    // --- 2. Start Sampling ---
    let (samples_tx, samples_rx) = watch::channel(ProgressSample::Unavailable);
    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(tracking_process(
        app_state.library.clone(),
        user_id,
        log_id,
        samples_rx,
        updates_tx,
        app_state.config.tracking_interval,
        token.clone(),
    ));

    // --- 3. Main Message Loop ---
    let exit = loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break Exit::EndedElsewhere,
            update = updates_rx.recv() => match update {
                Some(outcome) => {
                    let message = ServerMessage::Progress {
                        progress: outcome.progress,
                        duration_seconds: outcome.duration_seconds,
                    };
                    if send(&mut sender, &message).await.is_err() {
                        break Exit::Disconnected;
                    }
                }
                // The sampling task stopped on its own: the session is no longer active.
                None => break Exit::EndedElsewhere,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Back) => break Exit::Back,
                    Ok(ClientMessage::Init { .. }) => {
                        warn!(user_id, "Received subsequent Init message, which is ignored.");
                    }
                    Ok(message) => {
                        if let Some(sample) = message.sample() {
                            samples_tx.send_replace(sample);
                        }
                    }
                    Err(e) => warn!(user_id, error = %e, "Failed to deserialize client message"),
                },
                Some(Ok(Message::Close(_))) | None => break Exit::Disconnected,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(user_id, error = %e, "WebSocket receive failed");
                    break Exit::Disconnected;
                }
            },
        }
    };

    // --- 4. Cleanup ---
    let finished = leave_reading(app_state, &auth.session_id, user_id, log_id, &token).await;
    token.cancel();
    if let Err(e) = task.await {
        error!(user_id, error = %e, "Tracking task panicked");
    }
    let finished = finished.map_err(|(_, message)| ApiError::Internal(message))?;
    info!(user_id, log_id, exit = ?exit, "Reading session ended");

    if exit != Exit::Disconnected {
        if let Some(log) = finished {
            send(&mut sender, &ended_message(&log)).await?;
        }
        sender.close().await?;
    }
    Ok(())
}

/// The `session_ended` message for `log`.
///
/// The status comes from the progress: the log may be read just before a
/// concurrent close finalizes it.
pub fn ended_message(log: &ActivityLog) -> ServerMessage {
    ServerMessage::session_ended(ActivityStatus::for_progress(log.progress), log.progress)
}

/// Reuses the student's active session on `resource_id`, or opens a new one,
/// and moves this login into its reading view. `token` stops the sampling
/// task once the login leaves that view.
///
/// Borrowing already opens a session, so the socket that follows a borrow
/// attaches to it instead of starting a second one.
pub async fn attach(
    app_state: &AppState,
    auth: &AuthSession,
    resource_id: ResourceId,
    token: CancellationToken,
) -> LibraryResult<ActivityLogId> {
    let log_id = {
        let mut library = app_state.library.lock().await;
        let reusable = library
            .tracker()
            .active_session(auth.user.id)
            .filter(|session| session.resource_id == resource_id)
            .map(|session| session.log_id);
        match reusable {
            Some(log_id) => log_id,
            None => library.open(resource_id, auth.user.id, Utc::now())?,
        }
    };

    if let Some(context) = app_state.sessions.lock().await.get_mut(&auth.session_id) {
        context.start_reading(resource_id, log_id);
        context.reading_token = Some(token);
    }
    Ok(log_id)
}
