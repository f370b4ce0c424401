pub mod offline;
pub mod suggestion_llm;

pub use offline::OfflineSuggestionAdapter;
pub use suggestion_llm::OpenAiSuggestionAdapter;
