pub mod auth;
pub mod catalog;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod reports;
pub mod router;
pub mod store;
pub mod suggestions;
pub mod tracker;

pub use coordinator::Library;
pub use domain::{
    ActivityLog, ActivityLogId, ActivityStatus, Resource, ResourceDraft, ResourceId, ResourceType,
    Role, Suggestion, User, UserDraft, UserId,
};
pub use error::{LibraryError, LibraryResult};
pub use ports::{PortError, PortResult, SuggestionService};
pub use store::EntityStore;
pub use tracker::{ActivityTracker, ProgressSample, SampleOutcome, TrackerState};
