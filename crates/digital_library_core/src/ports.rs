//! crates/digital_library_core/src/ports.rs
//!
//! Defines the service contracts (traits) for collaborators outside the core.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like LLM APIs.

use async_trait::async_trait;

use crate::domain::Suggestion;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, API keys).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait SuggestionService: Send + Sync {
    /// Suggests resources matching a free-text query.
    ///
    /// Implementations may return more than the library shows; callers trim the list.
    async fn suggest(&self, query: &str) -> PortResult<Vec<Suggestion>>;
}
