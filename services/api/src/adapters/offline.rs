//! services/api/src/adapters/offline.rs
//!
//! Stand-in `SuggestionService` used when no API key is configured. It always
//! fails, which makes the core serve its fixed fallback list.

use async_trait::async_trait;
use digital_library_core::{
    ports::{PortError, PortResult, SuggestionService},
    Suggestion,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineSuggestionAdapter;

#[async_trait]
impl SuggestionService for OfflineSuggestionAdapter {
    async fn suggest(&self, _query: &str) -> PortResult<Vec<Suggestion>> {
        Err(PortError::Unauthorized)
    }
}
