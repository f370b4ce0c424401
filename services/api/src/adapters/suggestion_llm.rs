//! services/api/src/adapters/suggestion_llm.rs
//!
//! This module contains the adapter for the book-suggestion LLM.
//! It implements the `SuggestionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use digital_library_core::{
    ports::{PortError, PortResult, SuggestionService},
    suggestions::MAX_SUGGESTIONS,
    Suggestion,
};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SuggestionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSuggestionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    fence: Regex,
}

impl OpenAiSuggestionAdapter {
    /// Creates a new `OpenAiSuggestionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> PortResult<Self> {
        let fence = Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$")
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            client,
            model,
            fence,
        })
    }

    fn prompt(query: &str) -> String {
        format!(
            "Com base na consulta de pesquisa \"{}\", sugira {} livros. Para cada livro, forneça: \
             titulo, autor, uma breve sinopse (máximo 40 palavras) e capaUrl, uma URL de capa \
             fictícia no formato 'https://picsum.photos/seed/{{titulo-sem-espacos}}/200/300'. \
             Responda somente com um array JSON de objetos com as chaves titulo, autor, sinopse e capaUrl.",
            query, MAX_SUGGESTIONS
        )
    }

    /// Parses the model's answer, tolerating a surrounding markdown code fence.
    pub fn parse_reply(&self, reply: &str) -> PortResult<Vec<Suggestion>> {
        let body = match self.fence.captures(reply) {
            Some(captures) => captures.get(1).map_or("", |m| m.as_str()),
            None => reply.trim(),
        };

        let books: Vec<SuggestedBook> = serde_json::from_str(body).map_err(|e| {
            PortError::Unexpected(format!("Suggestion LLM returned malformed JSON: {}", e))
        })?;

        Ok(books.into_iter().map(Suggestion::from).collect())
    }
}

/// The shape the model is asked to answer with.
#[derive(Deserialize)]
struct SuggestedBook {
    titulo: String,
    autor: String,
    #[serde(default)]
    sinopse: String,
    #[serde(rename = "capaUrl", default)]
    capa_url: String,
}

impl From<SuggestedBook> for Suggestion {
    fn from(book: SuggestedBook) -> Self {
        Suggestion {
            title: book.titulo,
            author: book.autor,
            synopsis: book.sinopse,
            cover_url: book.capa_url,
        }
    }
}

//=========================================================================================
// `SuggestionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SuggestionService for OpenAiSuggestionAdapter {
    async fn suggest(&self, query: &str) -> PortResult<Vec<Suggestion>> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content("Você é um bibliotecário de uma biblioteca escolar digital.")
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(Self::prompt(query))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Suggestion LLM response contained no text content.".to_string())
            })?;

        debug!(query, "Received suggestion reply");
        self.parse_reply(&content)
    }
}
