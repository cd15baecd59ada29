//! crates/word_pocket_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage backends and provider APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    DictionaryLookup, GeneratedContent, GeneratedText, GenerationRequest, User, Word,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Local persistence of the three collections. Every write replaces the whole
/// collection snapshot; reads filter by owner and sort newest first.
pub trait StorageService: Send + Sync {
    // --- User ---
    fn get_user(&self) -> PortResult<Option<User>>;

    fn save_user(&self, user: &User) -> PortResult<()>;

    fn clear_user(&self) -> PortResult<()>;

    // --- Words ---
    fn get_words(&self, user_id: &str) -> PortResult<Vec<Word>>;

    fn add_word(&self, word: &Word) -> PortResult<()>;

    fn delete_word(&self, word_id: Uuid) -> PortResult<()>;

    // --- Texts ---
    fn get_texts(&self, user_id: &str) -> PortResult<Vec<GeneratedText>>;

    fn save_text(&self, text: &GeneratedText) -> PortResult<()>;

    fn delete_text(&self, text_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait DictionaryService: Send + Sync {
    /// Looks up a definition and example sentence. Never errors; provider
    /// failures come back as `DictionaryLookup::Failed`.
    async fn lookup(&self, word: &str, language: &str) -> DictionaryLookup;
}

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// Sends a single user prompt and returns the raw completion text.
    async fn complete(&self, prompt: &str) -> PortResult<String>;
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Produces a titled practice text that uses the requested vocabulary.
    async fn generate_text(&self, request: &GenerationRequest) -> PortResult<GeneratedContent>;
}
