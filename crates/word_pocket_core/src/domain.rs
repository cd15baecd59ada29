//! crates/word_pocket_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Represents the signed-in learner. The id is the email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl User {
    /// Builds a user from a login email. The display name is the local part.
    pub fn from_email(email: &str) -> Self {
        let email = email.trim().to_string();
        let name = email.split('@').next().unwrap_or_default().to_string();
        Self {
            id: email.clone(),
            email,
            name,
        }
    }
}

/// A single vocabulary item in a user's word bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub id: Uuid,
    pub user_id: String,
    pub word: String,
    pub language: String,
    pub translation: Option<String>,
    pub example_sentence: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A practice text produced by the language model.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedText {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub text_type: TextType,
    pub language: String,
    pub words_used: Vec<String>,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Generation Options
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextType {
    #[default]
    Paragraph,
    Dialog,
    ShortStory,
}

impl TextType {
    pub const ALL: [TextType; 3] = [TextType::Paragraph, TextType::Dialog, TextType::ShortStory];

    pub fn label(self) -> &'static str {
        match self {
            TextType::Paragraph => "Paragraph",
            TextType::Dialog => "Dialog",
            TextType::ShortStory => "Short Story",
        }
    }

    /// Parses a format label. Unknown labels fall back to `Paragraph`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "dialog" | "dialogue" => TextType::Dialog,
            "short story" | "story" | "shortstory" => TextType::ShortStory,
            _ => TextType::Paragraph,
        }
    }
}

impl fmt::Display for TextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthPreference {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthPreference {
    pub const ALL: [LengthPreference; 3] = [
        LengthPreference::Short,
        LengthPreference::Medium,
        LengthPreference::Long,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LengthPreference::Short => "short",
            LengthPreference::Medium => "medium",
            LengthPreference::Long => "long",
        }
    }

    /// The approximate word-count band handed to the model.
    pub fn word_band(self) -> &'static str {
        match self {
            LengthPreference::Short => "approx 50-80 words",
            LengthPreference::Medium => "approx 150-200 words",
            LengthPreference::Long => "approx 300-400 words",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "short" => Some(LengthPreference::Short),
            "medium" => Some(LengthPreference::Medium),
            "long" => Some(LengthPreference::Long),
            _ => None,
        }
    }
}

impl fmt::Display for LengthPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Languages offered by the shell, paired with their ISO 639-1 codes.
pub const LANGUAGES: [(&str, &str); 10] = [
    ("English", "en"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
    ("Italian", "it"),
    ("Portuguese", "pt"),
    ("Japanese", "ja"),
    ("Chinese", "zh"),
    ("Russian", "ru"),
    ("Arabic", "ar"),
];

pub const DEFAULT_LANGUAGE: &str = "English";

/// Maps a language name to the code used by dictionary providers.
/// Names not in [`LANGUAGES`] are lower-cased and passed through.
pub fn language_code(language: &str) -> String {
    LANGUAGES
        .iter()
        .find(|(name, code)| name.eq_ignore_ascii_case(language) || code.eq_ignore_ascii_case(language))
        .map(|(_, code)| code.to_string())
        .unwrap_or_else(|| language.trim().to_lowercase())
}

/// Everything the model needs to write one practice text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationRequest {
    pub words: Vec<String>,
    pub text_type: TextType,
    pub language: String,
    pub length: LengthPreference,
}

/// The parsed model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    pub title: String,
    pub content: String,
}

//=========================================================================================
// Dictionary Results
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DictionaryEntry {
    pub definition: Option<String>,
    pub example: Option<String>,
}

impl DictionaryEntry {
    /// Builds an entry, treating blank strings as absent.
    pub fn new(definition: Option<String>, example: Option<String>) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            definition: non_blank(definition),
            example: non_blank(example),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.definition.is_none() && self.example.is_none()
    }
}

/// The outcome of a dictionary lookup. Lookups never fail outright; a provider
/// problem is reported as `Failed` so callers can tell it apart from a miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryLookup {
    Found(DictionaryEntry),
    NotFound,
    Failed(String),
}

impl DictionaryLookup {
    pub fn into_entry(self) -> Option<DictionaryEntry> {
        match self {
            DictionaryLookup::Found(entry) if !entry.is_empty() => Some(entry),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_name_is_local_part_of_email() {
        let user = User::from_email("ada@example.com");
        assert_eq!(user.id, "ada@example.com");
        assert_eq!(user.name, "ada");
    }

    #[test]
    fn text_type_parsing_is_lenient() {
        assert_eq!(TextType::from_label("Short Story"), TextType::ShortStory);
        assert_eq!(TextType::from_label("story"), TextType::ShortStory);
        assert_eq!(TextType::from_label("DIALOG"), TextType::Dialog);
        assert_eq!(TextType::from_label("poem"), TextType::Paragraph);
    }

    #[test]
    fn language_codes() {
        assert_eq!(language_code("Spanish"), "es");
        assert_eq!(language_code("english"), "en");
        assert_eq!(language_code("Klingon"), "klingon");
    }

    #[test]
    fn blank_dictionary_fields_are_absent() {
        let entry = DictionaryEntry::new(Some("  ".into()), Some("An example.".into()));
        assert_eq!(entry.definition, None);
        assert_eq!(entry.example.as_deref(), Some("An example."));
        assert_eq!(DictionaryLookup::Found(DictionaryEntry::default()).into_entry(), None);
        assert_eq!(DictionaryLookup::Failed("boom".into()).into_entry(), None);
    }
}
