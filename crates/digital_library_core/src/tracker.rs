//! crates/digital_library_core/src/tracker.rs
//!
//! The activity tracker: a per-student state machine
//! (`Idle -> Active -> Finalized`) that turns periodic engagement samples into
//! updates of the student's current `ActivityLog`.
//!
//! The tracker never owns a log. It only remembers which log id is open for
//! each student; all reads and writes go through the `EntityStore`. Time is
//! passed in by the caller so the machine stays deterministic.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::domain::{ActivityLog, ActivityLogId, ResourceId, ResourceType, UserId};
use crate::error::{LibraryError, LibraryResult};
use crate::store::EntityStore;

/// How often an open session is sampled.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

/// A raw engagement reading taken from whatever is rendering the resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressSample {
    /// Playback position of an audio or video element. `duration_secs` is
    /// `None` until the element has loaded its metadata.
    Media {
        position_secs: f64,
        duration_secs: Option<f64>,
    },
    /// Scroll position of a text container.
    Scroll {
        offset: f64,
        scrollable_height: f64,
        viewport_height: f64,
    },
    /// Nothing is mounted to read from.
    Unavailable,
}

impl ProgressSample {
    /// Progress in `[0, 100]` for a resource of the given type.
    ///
    /// A sample of the wrong shape for the resource (for example a scroll
    /// reading for a video) measures nothing and yields 0.
    pub fn progress_for(&self, kind: ResourceType) -> f64 {
        let raw = match (*self, kind.is_playback()) {
            (
                ProgressSample::Media {
                    position_secs,
                    duration_secs,
                },
                true,
            ) => match duration_secs {
                Some(duration) if duration.is_finite() && duration > 0.0 => {
                    position_secs / duration * 100.0
                }
                _ => 0.0,
            },
            (
                ProgressSample::Scroll {
                    offset,
                    scrollable_height,
                    viewport_height,
                },
                false,
            ) => {
                let overflow = scrollable_height - viewport_height;
                if overflow > 0.0 {
                    offset / overflow * 100.0
                } else {
                    // Everything is already on screen.
                    100.0
                }
            }
            _ => 0.0,
        };
        clamp_progress(raw)
    }
}

/// Clamps a computed ratio into `[0, 100]`. NaN becomes 0.
pub fn clamp_progress(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}

/// The session currently being measured for one student.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub log_id: ActivityLogId,
    pub resource_id: ResourceId,
    pub resource_kind: ResourceType,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum TrackerState {
    #[default]
    Idle,
    Active(ActiveSession),
    /// The last session ended; its log is immutable.
    Finalized(ActivityLogId),
}

/// What a single sampling tick wrote to the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOutcome {
    pub log_id: ActivityLogId,
    pub progress: f64,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityTracker {
    sessions: HashMap<UserId, TrackerState>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, student_id: UserId) -> TrackerState {
        self.sessions.get(&student_id).cloned().unwrap_or_default()
    }

    pub fn active_session(&self, student_id: UserId) -> Option<&ActiveSession> {
        match self.sessions.get(&student_id) {
            Some(TrackerState::Active(session)) => Some(session),
            _ => None,
        }
    }

    /// Opens a session for `resource_id`, creating its log.
    ///
    /// A student has at most one active session: any session still open is
    /// finalized first.
    pub fn start(
        &mut self,
        store: &mut EntityStore,
        student_id: UserId,
        resource_id: ResourceId,
        now: DateTime<Utc>,
    ) -> LibraryResult<ActivityLogId> {
        let resource_kind = store.require_resource(resource_id)?.kind;

        if let Some(previous) = self.finish(store, student_id, now)? {
            debug!(
                student_id,
                log_id = previous.id,
                "Finalized previous session before opening a new one"
            );
        }

        let log_id = store.create_activity_log(student_id, resource_id, now);
        self.sessions.insert(
            student_id,
            TrackerState::Active(ActiveSession {
                log_id,
                resource_id,
                resource_kind,
                started_at: now,
            }),
        );
        debug!(student_id, resource_id, log_id, "Activity session started");
        Ok(log_id)
    }

    /// Applies one sampling tick to the open log `log_id`.
    ///
    /// Rejects samples addressed to a log that is no longer the student's
    /// active session, so a leftover timer cannot overwrite a newer session.
    pub fn record_sample(
        &mut self,
        store: &mut EntityStore,
        student_id: UserId,
        log_id: ActivityLogId,
        sample: ProgressSample,
        now: DateTime<Utc>,
    ) -> LibraryResult<SampleOutcome> {
        let session = match self.sessions.get(&student_id) {
            Some(TrackerState::Active(session)) if session.log_id == log_id => session,
            Some(TrackerState::Active(_)) => return Err(LibraryError::StaleSession(log_id)),
            _ => return Err(LibraryError::NoActiveSession(student_id)),
        };

        let progress = sample.progress_for(session.resource_kind);
        let duration_seconds = elapsed_seconds(session.started_at, now);
        store.update_log_progress(log_id, progress, duration_seconds)?;

        Ok(SampleOutcome {
            log_id,
            progress,
            duration_seconds,
        })
    }

    /// Ends the student's active session, if any, and returns the final log.
    pub fn finish(
        &mut self,
        store: &mut EntityStore,
        student_id: UserId,
        now: DateTime<Utc>,
    ) -> LibraryResult<Option<ActivityLog>> {
        let log_id = match self.sessions.get(&student_id) {
            Some(TrackerState::Active(session)) => session.log_id,
            _ => return Ok(None),
        };

        let log = store.finalize_log(log_id, now)?;
        self.sessions
            .insert(student_id, TrackerState::Finalized(log_id));
        debug!(
            student_id,
            log_id,
            status = %log.status,
            progress = log.progress,
            "Activity session finalized"
        );
        Ok(Some(log))
    }
}

fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - start).num_milliseconds().max(0);
    (millis as f64 / 1000.0).round() as u64
}
