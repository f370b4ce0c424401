//! crates/digital_library_core/src/suggestions.rs
//!
//! Turns the external suggestion service into catalog-shaped results.
//! The service is optional and fallible; callers always get a list back.

use tracing::warn;

use crate::domain::{Resource, ResourceType, Suggestion};
use crate::ports::SuggestionService;
use crate::store::PLACEHOLDER_CONTENT;

pub const MAX_SUGGESTIONS: usize = 3;

/// Category given to every suggested resource.
pub const SUGGESTION_CATEGORY: &str = "Recomendação de IA";

/// Asks the service for up to three suggestions.
///
/// Any port failure is logged and replaced by the fixed fallback list. A blank
/// query returns nothing without calling the service.
pub async fn suggest_resources(service: &dyn SuggestionService, query: &str) -> Vec<Resource> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    match service.suggest(query).await {
        Ok(suggestions) => suggestions
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .enumerate()
            .map(|(index, suggestion)| into_resource(index, suggestion, SUGGESTION_CATEGORY))
            .collect(),
        Err(e) => {
            warn!(error = %e, "Suggestion service failed, using fallback list");
            fallback_resources()
        }
    }
}

/// The list served when the suggestion service is unavailable.
pub fn fallback_resources() -> Vec<Resource> {
    FALLBACK
        .iter()
        .enumerate()
        .map(|(index, (title, author, synopsis, cover_seed, category))| {
            into_resource(
                index,
                Suggestion {
                    title: title.to_string(),
                    author: author.to_string(),
                    synopsis: synopsis.to_string(),
                    cover_url: format!("https://picsum.photos/seed/{}/200/300", cover_seed),
                },
                category,
            )
        })
        .collect()
}

/// Suggested resources are not in the catalog, so they get negative ids.
fn into_resource(index: usize, suggestion: Suggestion, category: &str) -> Resource {
    Resource {
        id: -(index as i64 + 1),
        kind: ResourceType::Book,
        title: suggestion.title,
        author: suggestion.author,
        synopsis: suggestion.synopsis,
        cover_url: suggestion.cover_url,
        category: category.to_string(),
        borrowed_by: None,
        content: Some(PLACEHOLDER_CONTENT.to_string()),
        audio_url: None,
        video_url: None,
    }
}

const FALLBACK: [(&str, &str, &str, &str, &str); 3] = [
    (
        "Neuromancer (Mock)",
        "William Gibson",
        "O romance que definiu o gênero cyberpunk, uma história de hackers e inteligência artificial em um futuro distópico e tecnológico.",
        "neuromancer",
        "Ficção Científica",
    ),
    (
        "Duna (Mock)",
        "Frank Herbert",
        "Uma saga épica de política, religião e poder no deserto planeta de Arrakis, a única fonte da especiaria que prolonga a vida.",
        "dune",
        "Ficção Científica",
    ),
    (
        "Fundação (Mock)",
        "Isaac Asimov",
        "A história da queda de um império galáctico e os esforços de um grupo de cientistas para preservar o conhecimento humano.",
        "foundation",
        "Ficção Clássica",
    ),
];
