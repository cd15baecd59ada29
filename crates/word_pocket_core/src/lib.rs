pub mod domain;
pub mod generation;
pub mod interactive_text;
pub mod ports;
pub mod word_bag;

pub use domain::{
    DictionaryEntry, DictionaryLookup, GeneratedContent, GeneratedText, GenerationRequest,
    LengthPreference, TextType, User, Word,
};
pub use generation::{build_generation_prompt, parse_generated_text, LlmTextGenerator};
pub use ports::{
    DictionaryService, LanguageModelService, PortError, PortResult, StorageService,
    TextGenerationService,
};
