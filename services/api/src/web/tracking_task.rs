//! services/api/src/web/tracking_task.rs
//!
//! This module contains the asynchronous "worker" function that samples an open
//! reading session on a fixed period and writes the result to the library.

use chrono::Utc;
use digital_library_core::{
    ActivityLogId, Library, LibraryError, ProgressSample, SampleOutcome, UserId,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why a sampling task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingEnd {
    /// The token was cancelled by whoever closed the session.
    Cancelled,
    /// The session is no longer the student's active one.
    SessionClosed,
}

/// The main asynchronous task for one reading session.
///
/// Every `period` it takes the latest sample from `samples`, records it against
/// `log_id` and forwards the outcome on `updates`. At most one tick runs per
/// period. The task ends as soon as `cancellation_token` fires, and never writes
/// after that.
pub async fn tracking_process(
    library: Arc<Mutex<Library>>,
    student_id: UserId,
    log_id: ActivityLogId,
    samples: watch::Receiver<ProgressSample>,
    updates: mpsc::UnboundedSender<SampleOutcome>,
    period: Duration,
    cancellation_token: CancellationToken,
) -> TrackingEnd {
    info!(student_id, log_id, "Tracking process started.");

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => {
                info!(student_id, log_id, "Tracking process cancelled.");
                return TrackingEnd::Cancelled;
            }
            _ = ticker.tick() => {}
        }

        let sample = *samples.borrow();
        let result = {
            let mut library = library.lock().await;
            // Cancellation may have happened while waiting for the lock.
            if cancellation_token.is_cancelled() {
                return TrackingEnd::Cancelled;
            }
            library.record_sample(student_id, log_id, sample, Utc::now())
        };

        match result {
            Ok(outcome) => {
                debug!(log_id, progress = outcome.progress, "Recorded sample");
                if updates.send(outcome).is_err() {
                    debug!(log_id, "Progress receiver dropped");
                }
            }
            Err(
                LibraryError::StaleSession(_)
                | LibraryError::NoActiveSession(_)
                | LibraryError::SessionFinalized(_),
            ) => {
                info!(student_id, log_id, "Session closed elsewhere. Tracking process ending.");
                return TrackingEnd::SessionClosed;
            }
            Err(e) => {
                warn!(student_id, log_id, error = %e, "Failed to record sample. Tracking process ending.");
                return TrackingEnd::SessionClosed;
            }
        }
    }
}
