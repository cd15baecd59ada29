//! crates/word_pocket_core/src/generation.rs
//!
//! Prompt construction and response parsing for practice-text generation.
//! The same functions back the direct client path and the proxy endpoint.

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::domain::{GeneratedContent, GenerationRequest, TextType};
use crate::ports::{LanguageModelService, PortResult, TextGenerationService};

pub const DEFAULT_TITLE: &str = "Practice Text";

static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^# Title:\s*(.*)").expect("title pattern is valid"));

// Anchored at the start of the whole response, not each line.
static LEADING_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# Title:.*\n+").expect("leading title pattern is valid"));

fn type_instruction(text_type: TextType) -> &'static str {
    match text_type {
        TextType::Dialog => "Create a natural conversation between 2-3 people.",
        TextType::ShortStory => {
            "Write a short narrative story with a clear beginning, middle, and end."
        }
        TextType::Paragraph => "Write a descriptive paragraph.",
    }
}

/// Builds the instruction sent to the language model.
pub fn build_generation_prompt(request: &GenerationRequest) -> String {
    format!(
        "You are a helpful language tutor. {instruction}\n\
         Create a {text_type} in {language}.\n\
         \n\
         Constraints:\n\
         1. You MUST use the following vocabulary words: {words}.\n\
         2. Every vocabulary word MUST be wrapped in **double asterisks**, like this: **word**. Do NOT use stars for anything else.\n\
         3. Length: {band}.\n\
         4. First line MUST be: \"# Title: [Your Creative Title]\".\n\
         5. The content should be suitable for language learners.\n\
         \n\
         Output:\n\
         # Title: [Title]\n\
         \n\
         [Content]",
        instruction = type_instruction(request.text_type),
        text_type = request.text_type,
        language = request.language,
        words = request.words.join(", "),
        band = request.length.word_band(),
    )
}

/// Splits a raw model response into a title and body.
///
/// The title comes from the first `# Title:` line anywhere in the response.
/// The body is the response with a leading title line (and the blank lines
/// after it) removed.
pub fn parse_generated_text(raw: &str) -> GeneratedContent {
    let title = TITLE_LINE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let content = LEADING_TITLE.replace(raw, "").trim().to_string();

    GeneratedContent { title, content }
}

/// Prompt asking a model for a dictionary entry as a JSON object.
pub fn build_dictionary_prompt(word: &str, language: &str) -> String {
    format!(
        "Provide a definition and a simple example sentence for the word \"{word}\" in the language \"{language}\".\n\
         Return ONLY a JSON object with keys \"definition\" (string) and \"example\" (string).\n\
         Keep the definition concise (under 20 words).\n\
         The example sentence should be simple and use the word.\n\
         If the word is invalid or you cannot find it, return empty strings."
    )
}

//=========================================================================================
// Model-backed Generator
//=========================================================================================

/// Implements `TextGenerationService` on top of any `LanguageModelService`.
#[derive(Clone)]
pub struct LlmTextGenerator {
    model: Arc<dyn LanguageModelService>,
}

impl LlmTextGenerator {
    pub fn new(model: Arc<dyn LanguageModelService>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl TextGenerationService for LlmTextGenerator {
    async fn generate_text(&self, request: &GenerationRequest) -> PortResult<GeneratedContent> {
        let prompt = build_generation_prompt(request);
        debug!(
            words = request.words.len(),
            prompt_len = prompt.len(),
            "Requesting practice text"
        );
        let raw = self.model.complete(&prompt).await?;
        Ok(parse_generated_text(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LengthPreference;
    use crate::ports::PortError;

    fn request(words: &[&str]) -> GenerationRequest {
        GenerationRequest {
            words: words.iter().map(|w| w.to_string()).collect(),
            text_type: TextType::ShortStory,
            language: "Spanish".to_string(),
            length: LengthPreference::Short,
        }
    }

    #[test]
    fn prompt_lists_words_and_constraints() {
        let prompt = build_generation_prompt(&request(&["gato", "perro"]));
        assert!(prompt.contains("Create a Short Story in Spanish."));
        assert!(prompt.contains("vocabulary words: gato, perro."));
        assert!(prompt.contains("**double asterisks**"));
        assert!(prompt.contains("approx 50-80 words"));
        assert!(prompt.contains("# Title:"));
        assert!(prompt.contains("clear beginning, middle, and end"));
    }

    #[test]
    fn parses_title_and_body() {
        let raw = "# Title: The Lazy **Cat**  \n\nI saw a **cat** today.\nIt slept.\n";
        let parsed = parse_generated_text(raw);
        assert_eq!(parsed.title, "The Lazy **Cat**");
        assert_eq!(parsed.content, "I saw a **cat** today.\nIt slept.");
    }

    #[test]
    fn missing_title_uses_default_and_keeps_body() {
        let parsed = parse_generated_text("  Just a body with **words**.  ");
        assert_eq!(parsed.title, DEFAULT_TITLE);
        assert_eq!(parsed.content, "Just a body with **words**.");
    }

    #[test]
    fn title_after_preamble_is_found_but_not_stripped() {
        let raw = "Sure!\n# Title: Late Title\n\nBody";
        let parsed = parse_generated_text(raw);
        assert_eq!(parsed.title, "Late Title");
        assert!(parsed.content.starts_with("Sure!"));
    }

    /// Wraps every vocabulary word it finds in the prompt in bold markers.
    struct BoldingModel;

    #[async_trait]
    impl LanguageModelService for BoldingModel {
        async fn complete(&self, prompt: &str) -> PortResult<String> {
            let words = prompt
                .split("vocabulary words: ")
                .nth(1)
                .and_then(|rest| rest.split(".\n").next())
                .ok_or_else(|| PortError::Unexpected("no word list".to_string()))?;
            let body = words
                .split(", ")
                .map(|w| format!("Here is **{w}**."))
                .collect::<Vec<_>>()
                .join(" ");
            Ok(format!("# Title: Test Story\n\n{body}"))
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModelService for FailingModel {
        async fn complete(&self, _prompt: &str) -> PortResult<String> {
            Err(PortError::Provider("503 upstream unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn every_word_appears_in_bold() {
        let generator = LlmTextGenerator::new(Arc::new(BoldingModel));
        let words = ["ubiquitous", "serendipity", "cat"];
        let result = generator.generate_text(&request(&words)).await.unwrap();
        assert_eq!(result.title, "Test Story");
        for word in words {
            assert!(result.content.contains(&format!("**{word}**")), "{word} not bolded");
        }
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let generator = LlmTextGenerator::new(Arc::new(FailingModel));
        let err = generator.generate_text(&request(&["cat"])).await.unwrap_err();
        assert!(matches!(err, PortError::Provider(_)));
    }
}
