//! services/api/src/shell/controller.rs
//!
//! The shell controller owns the application state. Every mutation is
//! persisted through the `StorageService` port before it lands in memory.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use word_pocket_core::domain::{
    GeneratedText, GenerationRequest, LengthPreference, TextType, User, Word, DEFAULT_LANGUAGE,
};
use word_pocket_core::ports::{
    DictionaryService, PortError, StorageService, TextGenerationService,
};

//=========================================================================================
// Shell Errors
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Please log in first")]
    NotLoggedIn,
    #[error("{0}")]
    InvalidInput(String),
    #[error("No word {0} in your bag")]
    WordNotFound(String),
    #[error("No text {0} in your collection")]
    TextNotFound(String),
    /// Shown to the user as a blocking alert. No retry is attempted.
    #[error("Error generating text. Please try again.")]
    Generation(#[source] PortError),
    #[error(transparent)]
    Port(#[from] PortError),
}

pub type ShellResult<T> = Result<T, ShellError>;

//=========================================================================================
// State
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppView {
    #[default]
    Landing,
    Dashboard,
    WordBag,
    Generate,
    MyTexts,
    TextDetail,
}

/// Everything the views render from. Owned by [`Shell`].
#[derive(Debug, Clone, Default)]
pub struct ShellState {
    pub view: AppView,
    pub user: Option<User>,
    /// Newest first.
    pub words: Vec<Word>,
    /// Newest first.
    pub texts: Vec<GeneratedText>,
    pub active_text: Option<Uuid>,
    pub active_word: Option<Uuid>,
}

impl ShellState {
    pub fn active_text(&self) -> Option<&GeneratedText> {
        self.active_text
            .and_then(|id| self.texts.iter().find(|t| t.id == id))
    }

    pub fn active_word(&self) -> Option<&Word> {
        self.active_word
            .and_then(|id| self.words.iter().find(|w| w.id == id))
    }
}

/// Input of the add-word form. Blank fields count as missing.
#[derive(Debug, Clone, Default)]
pub struct NewWord {
    pub word: String,
    pub language: Option<String>,
    pub translation: Option<String>,
    pub example_sentence: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub text_type: TextType,
    pub language: String,
    pub length: LengthPreference,
    pub selected_word_ids: Vec<Uuid>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Shortest id prefix accepted as a reference.
const MIN_ID_PREFIX: usize = 4;

/// Current time truncated to what storage keeps.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

//=========================================================================================
// The Controller
//=========================================================================================

pub struct Shell {
    state: ShellState,
    storage: Arc<dyn StorageService>,
    dictionary: Arc<dyn DictionaryService>,
    generator: Arc<dyn TextGenerationService>,
}

impl Shell {
    pub fn new(
        storage: Arc<dyn StorageService>,
        dictionary: Arc<dyn DictionaryService>,
        generator: Arc<dyn TextGenerationService>,
    ) -> Self {
        Self {
            state: ShellState::default(),
            storage,
            dictionary,
            generator,
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    fn user_id(&self) -> ShellResult<String> {
        self.state
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or(ShellError::NotLoggedIn)
    }

    fn load_user_data(&mut self, user_id: &str) -> ShellResult<()> {
        self.state.words = self.storage.get_words(user_id)?;
        self.state.texts = self.storage.get_texts(user_id)?;
        Ok(())
    }

    // --- Session ---

    /// Picks up a stored session: dashboard if someone is logged in, landing otherwise.
    pub fn restore(&mut self) -> ShellResult<()> {
        match self.storage.get_user()? {
            Some(user) => {
                self.load_user_data(&user.id)?;
                self.state.user = Some(user);
                self.state.view = AppView::Dashboard;
            }
            None => self.state = ShellState::default(),
        }
        Ok(())
    }

    /// Mock login: the email is the identity, nothing is verified.
    pub fn login(&mut self, email: &str) -> ShellResult<&User> {
        if email.trim().is_empty() {
            return Err(ShellError::InvalidInput("An email address is required".to_string()));
        }
        let user = User::from_email(email);
        self.storage.save_user(&user)?;
        self.load_user_data(&user.id)?;
        info!(user = %user.id, "Logged in");
        self.state.view = AppView::Dashboard;
        self.state.active_text = None;
        self.state.active_word = None;
        Ok(self.state.user.insert(user))
    }

    pub fn logout(&mut self) -> ShellResult<()> {
        self.storage.clear_user()?;
        self.state = ShellState::default();
        Ok(())
    }

    pub fn navigate(&mut self, view: AppView) -> ShellResult<()> {
        if view != AppView::Landing && self.state.user.is_none() {
            return Err(ShellError::NotLoggedIn);
        }
        if view == AppView::TextDetail && self.state.active_text().is_none() {
            return Err(ShellError::TextNotFound("(none selected)".to_string()));
        }
        self.state.view = view;
        Ok(())
    }

    // --- Words ---

    /// Adds a word, filling a blank definition (and then a blank example) from
    /// the dictionary. Returns `None` when the word itself is blank.
    pub async fn add_word(&mut self, input: NewWord) -> ShellResult<Option<Word>> {
        let user_id = self.user_id()?;
        let surface = input.word.trim().to_string();
        if surface.is_empty() {
            return Ok(None);
        }
        let language =
            non_blank(input.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let mut translation = non_blank(input.translation);
        let mut example_sentence = non_blank(input.example_sentence);

        if translation.is_none() {
            match self.dictionary.lookup(&surface, &language).await.into_entry() {
                Some(entry) => {
                    translation = entry.definition;
                    if example_sentence.is_none() {
                        example_sentence = entry.example;
                    }
                }
                None => warn!(word = %surface, "No definition found; saving without one"),
            }
        }

        let word = Word {
            id: Uuid::new_v4(),
            user_id,
            word: surface,
            language,
            translation,
            example_sentence,
            created_at: now_millis(),
        };

        self.storage.add_word(&word)?;
        self.state.words.insert(0, word.clone());
        Ok(Some(word))
    }

    pub fn delete_word(&mut self, word_id: Uuid) -> ShellResult<()> {
        self.storage.delete_word(word_id)?;
        self.state.words.retain(|w| w.id != word_id);
        self.state.active_word = None;
        Ok(())
    }

    /// Opens the word detail view over the word bag.
    pub fn open_word(&mut self, word_id: Uuid) -> ShellResult<&Word> {
        self.user_id()?;
        let word = self
            .state
            .words
            .iter()
            .find(|w| w.id == word_id)
            .ok_or_else(|| ShellError::WordNotFound(word_id.to_string()))?;
        self.state.active_word = Some(word.id);
        self.state.view = AppView::WordBag;
        Ok(word)
    }

    pub fn close_word(&mut self) {
        self.state.active_word = None;
    }

    /// Resolves a full id, an id prefix, or a surface form to a word id.
    pub fn find_word(&self, reference: &str) -> Option<Uuid> {
        find_by_ref(
            self.state.words.iter().map(|w| (w.id, w.word.as_str())),
            reference,
        )
    }

    // --- Texts ---

    /// Generates a text from the selected words, stores it and opens it.
    pub async fn generate(&mut self, options: GenerateOptions) -> ShellResult<&GeneratedText> {
        let user_id = self.user_id()?;

        let selected_words: Vec<String> = self
            .state
            .words
            .iter()
            .filter(|w| options.selected_word_ids.contains(&w.id))
            .map(|w| w.word.clone())
            .collect();
        if selected_words.is_empty() {
            return Err(ShellError::InvalidInput(
                "Select at least one word to generate a text".to_string(),
            ));
        }

        let language = if options.language.trim().is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            options.language
        };

        let request = GenerationRequest {
            words: selected_words,
            text_type: options.text_type,
            language,
            length: options.length,
        };

        let result = self.generator.generate_text(&request).await.map_err(|e| {
            error!("Text generation failed: {}", e);
            ShellError::Generation(e)
        })?;

        let text = GeneratedText {
            id: Uuid::new_v4(),
            user_id,
            title: result.title,
            content: result.content,
            text_type: request.text_type,
            language: request.language,
            words_used: request.words,
            created_at: now_millis(),
        };

        self.storage.save_text(&text)?;
        self.state.active_text = Some(text.id);
        self.state.view = AppView::TextDetail;
        self.state.texts.insert(0, text);
        Ok(&self.state.texts[0])
    }

    pub fn open_text(&mut self, text_id: Uuid) -> ShellResult<&GeneratedText> {
        self.user_id()?;
        let text = self
            .state
            .texts
            .iter()
            .find(|t| t.id == text_id)
            .ok_or_else(|| ShellError::TextNotFound(text_id.to_string()))?;
        self.state.active_text = Some(text.id);
        self.state.view = AppView::TextDetail;
        Ok(text)
    }

    pub fn delete_text(&mut self, text_id: Uuid) -> ShellResult<()> {
        self.storage.delete_text(text_id)?;
        self.state.texts.retain(|t| t.id != text_id);
        if self.state.active_text == Some(text_id) {
            self.state.active_text = None;
            self.state.view = AppView::MyTexts;
        }
        Ok(())
    }

    /// Resolves a full id, an id prefix, or a title to a text id.
    pub fn find_text(&self, reference: &str) -> Option<Uuid> {
        find_by_ref(
            self.state.texts.iter().map(|t| (t.id, t.title.as_str())),
            reference,
        )
    }
}

fn find_by_ref<'a>(items: impl Iterator<Item = (Uuid, &'a str)> + Clone, reference: &str) -> Option<Uuid> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if let Ok(id) = Uuid::parse_str(reference) {
        return items.clone().find(|(item_id, _)| *item_id == id).map(|(id, _)| id);
    }
    let needle = reference.to_lowercase();
    // Spellings take precedence over id prefixes.
    if let Some((id, _)) = items.clone().find(|(_, name)| name.to_lowercase() == needle) {
        return Some(id);
    }
    if needle.len() < MIN_ID_PREFIX {
        return None;
    }
    let mut matches = items.filter(|(id, _)| id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some((id, _)), None) => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LocalStorageAdapter, MemoryKeyValueStore};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use word_pocket_core::domain::{DictionaryEntry, DictionaryLookup, GeneratedContent};
    use word_pocket_core::ports::PortResult;

    struct FixedDictionary(DictionaryLookup);

    #[async_trait]
    impl DictionaryService for FixedDictionary {
        async fn lookup(&self, _word: &str, _language: &str) -> DictionaryLookup {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct EchoGenerator {
        fail: bool,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl TextGenerationService for EchoGenerator {
        async fn generate_text(&self, request: &GenerationRequest) -> PortResult<GeneratedContent> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(PortError::Provider("boom".to_string()));
            }
            Ok(GeneratedContent {
                title: "Echo".to_string(),
                content: request
                    .words
                    .iter()
                    .map(|w| format!("**{w}**"))
                    .collect::<Vec<_>>()
                    .join(" "),
            })
        }
    }

    fn shell_with(lookup: DictionaryLookup, generator: Arc<EchoGenerator>) -> (Shell, Arc<dyn StorageService>) {
        let storage: Arc<dyn StorageService> =
            Arc::new(LocalStorageAdapter::new(MemoryKeyValueStore::new()));
        let shell = Shell::new(storage.clone(), Arc::new(FixedDictionary(lookup)), generator);
        (shell, storage)
    }

    fn new_word(word: &str) -> NewWord {
        NewWord {
            word: word.to_string(),
            ..NewWord::default()
        }
    }

    fn select(ids: &[Uuid]) -> GenerateOptions {
        GenerateOptions {
            selected_word_ids: ids.to_vec(),
            ..GenerateOptions::default()
        }
    }

    fn stored_word(id: &str, word: &str) -> Word {
        Word {
            id: Uuid::parse_str(id).unwrap(),
            user_id: "ada@example.com".to_string(),
            word: word.to_string(),
            language: "English".to_string(),
            translation: None,
            example_sentence: None,
            created_at: now_millis(),
        }
    }

    #[tokio::test]
    async fn actions_require_login() {
        let (mut shell, _) = shell_with(DictionaryLookup::NotFound, Arc::default());
        shell.restore().unwrap();
        assert_eq!(shell.state().view, AppView::Landing);
        assert!(matches!(shell.add_word(new_word("cat")).await, Err(ShellError::NotLoggedIn)));
        assert!(matches!(shell.navigate(AppView::Dashboard), Err(ShellError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn login_restore_and_logout() {
        let (mut shell, storage) = shell_with(DictionaryLookup::NotFound, Arc::default());
        let user = shell.login("ada@example.com").unwrap().clone();
        assert_eq!(user.name, "ada");
        assert_eq!(shell.state().view, AppView::Dashboard);
        shell.add_word(new_word("cat")).await.unwrap();

        let mut restored = Shell::new(
            storage.clone(),
            Arc::new(FixedDictionary(DictionaryLookup::NotFound)),
            Arc::new(EchoGenerator::default()),
        );
        restored.restore().unwrap();
        assert_eq!(restored.state().user.as_ref(), Some(&user));
        assert_eq!(restored.state().words.len(), 1);
        assert_eq!(restored.state().view, AppView::Dashboard);

        restored.logout().unwrap();
        assert!(restored.state().user.is_none());
        assert!(restored.state().words.is_empty());
        assert_eq!(restored.state().view, AppView::Landing);
        assert!(storage.get_user().unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_definition_is_filled_from_dictionary() {
        let entry = DictionaryEntry::new(
            Some("present everywhere".to_string()),
            Some("Smartphones are ubiquitous.".to_string()),
        );
        let (mut shell, storage) = shell_with(DictionaryLookup::Found(entry), Arc::default());
        shell.login("ada@example.com").unwrap();

        let word = shell.add_word(new_word("ubiquitous")).await.unwrap().unwrap();
        assert_eq!(word.translation.as_deref(), Some("present everywhere"));
        assert_eq!(word.example_sentence.as_deref(), Some("Smartphones are ubiquitous."));
        assert_eq!(word.language, "English");
        assert_eq!(storage.get_words("ada@example.com").unwrap(), vec![word]);
    }

    #[tokio::test]
    async fn user_supplied_fields_win_over_dictionary() {
        let entry = DictionaryEntry::new(Some("from dictionary".into()), Some("dict example".into()));
        let (mut shell, _) = shell_with(DictionaryLookup::Found(entry), Arc::default());
        shell.login("ada@example.com").unwrap();

        let mine = shell
            .add_word(NewWord {
                word: "gato".to_string(),
                language: Some("Spanish".to_string()),
                translation: Some("cat".to_string()),
                example_sentence: None,
            })
            .await
            .unwrap()
            .unwrap();
        // A supplied definition skips the lookup entirely.
        assert_eq!(mine.translation.as_deref(), Some("cat"));
        assert_eq!(mine.example_sentence, None);

        let kept = shell
            .add_word(NewWord {
                word: "perro".to_string(),
                example_sentence: Some("Mi perro.".to_string()),
                ..NewWord::default()
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.translation.as_deref(), Some("from dictionary"));
        assert_eq!(kept.example_sentence.as_deref(), Some("Mi perro."));
    }

    #[tokio::test]
    async fn failed_lookup_still_saves_the_word() {
        let (mut shell, storage) =
            shell_with(DictionaryLookup::Failed("timeout".to_string()), Arc::default());
        shell.login("ada@example.com").unwrap();
        let word = shell.add_word(new_word("qwxz")).await.unwrap().unwrap();
        assert_eq!(word.translation, None);
        assert_eq!(storage.get_words("ada@example.com").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_word_is_ignored_and_duplicates_allowed() {
        let (mut shell, _) = shell_with(DictionaryLookup::NotFound, Arc::default());
        shell.login("ada@example.com").unwrap();
        assert!(shell.add_word(new_word("   ")).await.unwrap().is_none());
        shell.add_word(new_word("cat")).await.unwrap();
        shell.add_word(new_word("cat")).await.unwrap();
        assert_eq!(shell.state().words.len(), 2);
    }

    #[tokio::test]
    async fn delete_word_clears_selection() {
        let (mut shell, storage) = shell_with(DictionaryLookup::NotFound, Arc::default());
        shell.login("ada@example.com").unwrap();
        let a = shell.add_word(new_word("a")).await.unwrap().unwrap();
        let b = shell.add_word(new_word("b")).await.unwrap().unwrap();
        shell.open_word(a.id).unwrap();

        shell.delete_word(a.id).unwrap();

        assert!(shell.state().active_word.is_none());
        assert_eq!(shell.state().words, vec![b.clone()]);
        assert_eq!(storage.get_words("ada@example.com").unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn generate_uses_selected_words_and_opens_text() {
        let generator = Arc::new(EchoGenerator::default());
        let (mut shell, storage) = shell_with(DictionaryLookup::NotFound, generator.clone());
        shell.login("ada@example.com").unwrap();
        let cat = shell.add_word(new_word("cat")).await.unwrap().unwrap();
        let _dog = shell.add_word(new_word("dog")).await.unwrap().unwrap();
        let owl = shell.add_word(new_word("owl")).await.unwrap().unwrap();

        let text = shell
            .generate(GenerateOptions {
                text_type: TextType::Dialog,
                language: "French".to_string(),
                length: LengthPreference::Short,
                selected_word_ids: vec![cat.id, owl.id],
            })
            .await
            .unwrap()
            .clone();

        assert_eq!(text.words_used, vec!["owl".to_string(), "cat".to_string()]);
        for word in &text.words_used {
            assert!(text.content.contains(&format!("**{word}**")));
        }
        assert_eq!(text.text_type, TextType::Dialog);
        assert_eq!(shell.state().view, AppView::TextDetail);
        assert_eq!(shell.state().active_text(), Some(&text));
        assert_eq!(storage.get_texts("ada@example.com").unwrap(), vec![text]);
        assert_eq!(generator.seen.lock().unwrap()[0].language, "French");
    }

    #[tokio::test]
    async fn generation_failure_is_user_visible_and_saves_nothing() {
        let generator = Arc::new(EchoGenerator {
            fail: true,
            ..EchoGenerator::default()
        });
        let (mut shell, storage) = shell_with(DictionaryLookup::NotFound, generator);
        shell.login("ada@example.com").unwrap();
        let cat = shell.add_word(new_word("cat")).await.unwrap().unwrap();
        shell.navigate(AppView::Generate).unwrap();

        let err = shell.generate(select(&[cat.id])).await.unwrap_err();
        assert_eq!(err.to_string(), "Error generating text. Please try again.");
        assert_eq!(shell.state().view, AppView::Generate);
        assert!(storage.get_texts("ada@example.com").unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_the_open_text_returns_to_list() {
        let (mut shell, _) = shell_with(DictionaryLookup::NotFound, Arc::default());
        shell.login("ada@example.com").unwrap();
        let cat = shell.add_word(new_word("cat")).await.unwrap().unwrap();
        let first = shell.generate(select(&[cat.id])).await.unwrap().id;
        let second = shell.generate(select(&[cat.id])).await.unwrap().id;

        shell.open_text(first).unwrap();
        shell.delete_text(second).unwrap();
        assert_eq!(shell.state().view, AppView::TextDetail);

        shell.delete_text(first).unwrap();
        assert_eq!(shell.state().view, AppView::MyTexts);
        assert!(shell.state().active_text.is_none());
        assert!(shell.state().texts.is_empty());
    }

    #[tokio::test]
    async fn words_resolve_by_id_prefix_or_surface() {
        let (mut shell, _) = shell_with(DictionaryLookup::NotFound, Arc::default());
        shell.login("ada@example.com").unwrap();
        let cat = shell.add_word(new_word("Cat")).await.unwrap().unwrap();

        assert_eq!(shell.find_word(&cat.id.to_string()), Some(cat.id));
        assert_eq!(shell.find_word(&cat.id.to_string()[..8]), Some(cat.id));
        assert_eq!(shell.find_word("cat"), Some(cat.id));
        assert_eq!(shell.find_word("dog"), None);
    }

    #[tokio::test]
    async fn spelling_beats_id_prefix() {
        let (mut shell, storage) = shell_with(DictionaryLookup::NotFound, Arc::default());
        let cat = stored_word("be000000-0000-4000-8000-000000000000", "cat");
        let be = stored_word("11111111-0000-4000-8000-000000000000", "be");
        storage.add_word(&cat).unwrap();
        storage.add_word(&be).unwrap();
        shell.login("ada@example.com").unwrap();

        assert_eq!(shell.find_word("be"), Some(be.id));
        assert_eq!(shell.find_word("BE"), Some(be.id));
        // Too short to be read as an id prefix.
        assert_eq!(shell.find_word("111"), None);
        assert_eq!(shell.find_word("1111"), Some(be.id));
        assert_eq!(shell.find_word("be00"), Some(cat.id));

        let id = shell.find_word("be").unwrap();
        shell.delete_word(id).unwrap();
        let left: Vec<&str> = shell.state().words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(left, vec!["cat"]);
    }

    #[tokio::test]
    async fn ambiguous_id_prefix_resolves_to_nothing() {
        let (mut shell, storage) = shell_with(DictionaryLookup::NotFound, Arc::default());
        storage.add_word(&stored_word("abcd0000-0000-4000-8000-000000000001", "cat")).unwrap();
        storage.add_word(&stored_word("abcd0000-0000-4000-8000-000000000002", "dog")).unwrap();
        shell.login("ada@example.com").unwrap();

        assert_eq!(shell.find_word("abcd"), None);
        assert!(shell.find_word("abcd0000-0000-4000-8000-00000000000").is_none());
        assert!(shell.find_word("abcd0000-0000-4000-8000-000000000002").is_some());
    }

    #[tokio::test]
    async fn generate_needs_a_selected_word() {
        let generator = Arc::new(EchoGenerator::default());
        let (mut shell, storage) = shell_with(DictionaryLookup::NotFound, generator.clone());
        shell.login("ada@example.com").unwrap();

        let err = shell.generate(GenerateOptions::default()).await.unwrap_err();
        assert!(matches!(err, ShellError::InvalidInput(_)));

        // Ids of words no longer in the bag count as nothing selected.
        let err = shell.generate(select(&[Uuid::new_v4()])).await.unwrap_err();
        assert!(matches!(err, ShellError::InvalidInput(_)));

        assert!(generator.seen.lock().unwrap().is_empty());
        assert!(storage.get_texts("ada@example.com").unwrap().is_empty());
    }
}
