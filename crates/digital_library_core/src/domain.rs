//! crates/digital_library_core/src/domain.rs
//!
//! Defines the pure, core data structures for the library.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::LibraryError;

pub type UserId = i64;
pub type ResourceId = i64;
pub type ActivityLogId = i64;

/// Progress (0-100) at or above which a finalized session counts as completed.
pub const COMPLETION_THRESHOLD: f64 = 95.0;

//=========================================================================================
// Users
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(LibraryError::InvalidInput(format!("unknown role '{}'", other))),
        }
    }
}

/// A library account. `teacher_id` is only meaningful for students.
///
/// The password is kept in plain text: accounts live only in memory for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub institution: String,
    pub teacher_id: Option<UserId>,
}

impl User {
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Registration input: a `User` before the store has assigned it an id.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub institution: String,
    pub teacher_id: Option<UserId>,
}

//=========================================================================================
// Resources
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Book,
    Video,
    Audio,
    Audiobook,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Book => "book",
            ResourceType::Video => "video",
            ResourceType::Audio => "audio",
            ResourceType::Audiobook => "audiobook",
        }
    }

    /// Whether engagement is measured from a media element's playback position
    /// rather than from scrolling through text.
    pub fn is_playback(&self) -> bool {
        !matches!(self, ResourceType::Book)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(ResourceType::Book),
            "video" => Ok(ResourceType::Video),
            "audio" => Ok(ResourceType::Audio),
            "audiobook" => Ok(ResourceType::Audiobook),
            other => Err(LibraryError::InvalidInput(format!(
                "unknown resource type '{}'",
                other
            ))),
        }
    }
}

/// A borrowable library item.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceType,
    pub title: String,
    pub author: String,
    pub synopsis: String,
    pub cover_url: String,
    pub category: String,
    /// The student currently holding the resource, if any.
    pub borrowed_by: Option<UserId>,
    pub content: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
}

impl Resource {
    pub fn is_available(&self) -> bool {
        self.borrowed_by.is_none()
    }

    pub fn is_held_by(&self, user_id: UserId) -> bool {
        self.borrowed_by == Some(user_id)
    }
}

/// Input for adding a resource to the catalog.
#[derive(Debug, Clone)]
pub struct ResourceDraft {
    pub kind: ResourceType,
    pub title: String,
    pub author: String,
    pub synopsis: String,
    pub cover_url: String,
    pub category: String,
    pub content: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
}

/// A recommendation returned by the suggestion service. Not part of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub title: String,
    pub author: String,
    pub synopsis: String,
    pub cover_url: String,
}

//=========================================================================================
// Activity
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityStatus {
    InProgress,
    Completed,
}

impl ActivityStatus {
    /// The status a session ends with, given its last measured progress.
    pub fn for_progress(progress: f64) -> Self {
        if progress >= COMPLETION_THRESHOLD {
            ActivityStatus::Completed
        } else {
            ActivityStatus::InProgress
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::InProgress => "in-progress",
            ActivityStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reading, viewing or listening session.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub student_id: UserId,
    pub resource_id: ResourceId,
    pub start_time: DateTime<Utc>,
    /// `None` while the session is still open.
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: u64,
    /// Percentage in `[0, 100]`.
    pub progress: f64,
    pub status: ActivityStatus,
}

impl ActivityLog {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_threshold_is_inclusive() {
        assert_eq!(ActivityStatus::for_progress(95.0), ActivityStatus::Completed);
        assert_eq!(ActivityStatus::for_progress(100.0), ActivityStatus::Completed);
        assert_eq!(ActivityStatus::for_progress(94.99), ActivityStatus::InProgress);
        assert_eq!(ActivityStatus::for_progress(0.0), ActivityStatus::InProgress);
    }

    #[test]
    fn enums_parse_their_wire_names() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!("audiobook".parse::<ResourceType>().unwrap(), ResourceType::Audiobook);
        assert!("magazine".parse::<ResourceType>().is_err());
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn only_books_are_measured_by_scrolling() {
        assert!(!ResourceType::Book.is_playback());
        assert!(ResourceType::Video.is_playback());
        assert!(ResourceType::Audio.is_playback());
        assert!(ResourceType::Audiobook.is_playback());
    }
}
