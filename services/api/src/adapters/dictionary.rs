//! services/api/src/adapters/dictionary.rs
//!
//! Dictionary lookup adapters. Both implement the `DictionaryService` port and
//! are interchangeable: one queries a public definitions API, the other asks a
//! language model for a small JSON object.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};
use word_pocket_core::domain::{language_code, DictionaryEntry, DictionaryLookup};
use word_pocket_core::generation::build_dictionary_prompt;
use word_pocket_core::ports::{DictionaryService, LanguageModelService, PortError, PortResult};

//=========================================================================================
// Public Definitions API
//=========================================================================================

#[derive(Deserialize)]
struct ApiEntry {
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
}

#[derive(Deserialize)]
struct ApiMeaning {
    #[serde(default)]
    definitions: Vec<ApiDefinition>,
}

#[derive(Deserialize)]
struct ApiDefinition {
    definition: Option<String>,
    example: Option<String>,
}

/// Looks words up at `{base}/{language code}/{word}`.
#[derive(Clone)]
pub struct FreeDictionaryAdapter {
    client: Client,
    base_url: String,
}

impl FreeDictionaryAdapter {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn entry_url(&self, word: &str, language: &str) -> PortResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PortError::Unexpected(format!("Invalid dictionary URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected("Dictionary URL cannot take a path".to_string()))?
            .pop_if_empty()
            .push(&language_code(language))
            .push(word.trim());
        Ok(url)
    }

    async fn fetch(&self, word: &str, language: &str) -> PortResult<Option<DictionaryEntry>> {
        let url = self.entry_url(word, language)?;
        debug!(%url, "Dictionary request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Provider(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PortError::Provider(format!(
                "dictionary returned {}",
                response.status()
            )));
        }

        let entries: Vec<ApiEntry> = response
            .json()
            .await
            .map_err(|e| PortError::Provider(format!("Unreadable dictionary response: {e}")))?;

        let first = entries
            .into_iter()
            .next()
            .and_then(|entry| entry.meanings.into_iter().next())
            .and_then(|meaning| meaning.definitions.into_iter().next());

        Ok(first
            .map(|d| DictionaryEntry::new(d.definition, d.example))
            .filter(|entry| !entry.is_empty()))
    }
}

#[async_trait]
impl DictionaryService for FreeDictionaryAdapter {
    async fn lookup(&self, word: &str, language: &str) -> DictionaryLookup {
        match self.fetch(word, language).await {
            Ok(Some(entry)) => DictionaryLookup::Found(entry),
            Ok(None) => DictionaryLookup::NotFound,
            Err(e) => {
                warn!(word, language, error = %e, "Dictionary lookup failed");
                DictionaryLookup::Failed(e.to_string())
            }
        }
    }
}

//=========================================================================================
// Language-Model Dictionary
//=========================================================================================

#[derive(Deserialize)]
struct ModelEntry {
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    example: Option<String>,
}

/// Asks a language model for `{"definition": ..., "example": ...}`.
#[derive(Clone)]
pub struct LlmDictionaryAdapter {
    model: Arc<dyn LanguageModelService>,
}

impl LlmDictionaryAdapter {
    pub fn new(model: Arc<dyn LanguageModelService>) -> Self {
        Self { model }
    }
}

/// Pulls the JSON object out of a reply that may be wrapped in prose or code fences.
fn parse_model_entry(reply: &str) -> PortResult<DictionaryEntry> {
    let json = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => "{}",
    };
    let entry: ModelEntry = serde_json::from_str(json)
        .map_err(|e| PortError::Provider(format!("Model returned malformed JSON: {e}")))?;
    Ok(DictionaryEntry::new(entry.definition, entry.example))
}

#[async_trait]
impl DictionaryService for LlmDictionaryAdapter {
    async fn lookup(&self, word: &str, language: &str) -> DictionaryLookup {
        let prompt = build_dictionary_prompt(word, language);
        let result = match self.model.complete(&prompt).await {
            Ok(reply) => parse_model_entry(&reply),
            Err(e) => Err(e),
        };
        match result {
            Ok(entry) if entry.is_empty() => DictionaryLookup::NotFound,
            Ok(entry) => DictionaryLookup::Found(entry),
            Err(e) => {
                warn!(word, language, error = %e, "Dictionary lookup failed");
                DictionaryLookup::Failed(e.to_string())
            }
        }
    }
}
