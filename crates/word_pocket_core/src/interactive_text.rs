//! crates/word_pocket_core/src/interactive_text.rs
//!
//! Splits generated content on `**bold**` markers and links each marked token
//! to the matching word in the user's bag.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::Word;

static BOLD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*.*?\*\*").expect("bold pattern is valid"));

pub const NO_DEFINITION: &str = "No definition saved.";
pub const NOT_IN_BAG: &str = "Word found in text but not in your bag.";

#[derive(Debug, Clone, PartialEq)]
pub enum TextSegment<'a> {
    Plain(&'a str),
    Highlight {
        token: &'a str,
        word: Option<&'a Word>,
    },
}

/// What the tooltip for a highlighted token shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub heading: String,
    pub language: Option<String>,
    pub body: PopupBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupBody {
    Known {
        definition: Option<String>,
        example: Option<String>,
    },
    NotInBag,
}

impl PopupBody {
    /// Lines shown inside the tooltip, fallbacks included.
    pub fn lines(&self) -> Vec<String> {
        match self {
            PopupBody::Known {
                definition,
                example,
            } => {
                let mut lines = vec![definition
                    .clone()
                    .unwrap_or_else(|| NO_DEFINITION.to_string())];
                if let Some(example) = example {
                    lines.push(format!("\"{example}\""));
                }
                lines
            }
            PopupBody::NotInBag => vec![NOT_IN_BAG.to_string()],
        }
    }
}

impl TextSegment<'_> {
    /// The popup for a highlighted token, `None` for plain text.
    pub fn popup(&self) -> Option<Popup> {
        match self {
            TextSegment::Plain(_) => None,
            TextSegment::Highlight { token, word } => Some(match word {
                Some(word) => Popup {
                    heading: word.word.clone(),
                    language: Some(word.language.clone()).filter(|l| !l.is_empty()),
                    body: PopupBody::Known {
                        definition: word.translation.clone(),
                        example: word.example_sentence.clone(),
                    },
                },
                None => Popup {
                    heading: token.to_string(),
                    language: None,
                    body: PopupBody::NotInBag,
                },
            }),
        }
    }
}

/// Splits `content` into alternating plain and highlighted segments.
///
/// Markers never span lines. A highlighted token with no matching word is
/// still returned as a highlight so malformed model output is never dropped.
pub fn segment<'a>(content: &'a str, words: &'a [Word]) -> Vec<TextSegment<'a>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for marker in BOLD_TOKEN.find_iter(content) {
        if marker.start() > cursor {
            segments.push(TextSegment::Plain(&content[cursor..marker.start()]));
        }
        let token = &content[marker.start() + 2..marker.end() - 2];
        segments.push(TextSegment::Highlight {
            token,
            word: find_word(words, token),
        });
        cursor = marker.end();
    }

    if cursor < content.len() {
        segments.push(TextSegment::Plain(&content[cursor..]));
    }
    segments
}

fn find_word<'a>(words: &'a [Word], token: &str) -> Option<&'a Word> {
    let needle = token.to_lowercase();
    words.iter().find(|w| w.word.to_lowercase() == needle)
}

/// The content with every `**` marker removed.
pub fn plain_text(content: &str) -> String {
    content.replace("**", "")
}
