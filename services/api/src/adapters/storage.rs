//! services/api/src/adapters/storage.rs
//!
//! This module contains the local persistence adapter, the concrete implementation
//! of the `StorageService` port. Each collection lives under a single key as a
//! JSON array holding every user's records; reads filter by owner.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;
use word_pocket_core::domain::{GeneratedText, TextType, User, Word};
use word_pocket_core::ports::{PortError, PortResult, StorageService};

pub const USER_KEY: &str = "lingoloom_user";
pub const WORDS_KEY: &str = "lingoloom_words";
pub const TEXTS_KEY: &str = "lingoloom_texts";

//=========================================================================================
// Raw Key-Value Stores
//=========================================================================================

/// A string key-value store in the shape of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
    fn remove(&self, key: &str) -> PortResult<()>;
}

/// Keeps one `<key>.json` file per key inside a directory.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Creates the store, making the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> PortResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            PortError::Storage(format!("Cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Storage(format!("Failed to read {key}: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| PortError::Storage(format!("Failed to write {key}: {e}")))
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Storage(format!("Failed to remove {key}: {e}"))),
        }
    }
}

/// An in-process store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> PortResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| PortError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

//=========================================================================================
// "Impure" Stored Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
struct UserRecord {
    id: String,
    email: String,
    name: String,
}
impl UserRecord {
    fn from_domain(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
        }
    }
}

/// Ids are kept as stored. Ones that are not UUIDs (the browser build used
/// millisecond timestamps) map to a stable name-based UUID.
fn record_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes()))
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordRecord {
    id: String,
    user_id: String,
    word: String,
    language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    example_sentence: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}
impl WordRecord {
    fn from_domain(word: &Word) -> Self {
        Self {
            id: word.id.to_string(),
            user_id: word.user_id.clone(),
            word: word.word.clone(),
            language: word.language.clone(),
            translation: word.translation.clone(),
            example_sentence: word.example_sentence.clone(),
            created_at: word.created_at,
        }
    }
    fn to_domain(self) -> Word {
        Word {
            id: record_id(&self.id),
            user_id: self.user_id,
            word: self.word,
            language: self.language,
            translation: self.translation,
            example_sentence: self.example_sentence,
            created_at: self.created_at,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextRecord {
    id: String,
    user_id: String,
    title: String,
    content: String,
    #[serde(rename = "type")]
    text_type: String,
    language: String,
    words_used: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}
impl TextRecord {
    fn from_domain(text: &GeneratedText) -> Self {
        Self {
            id: text.id.to_string(),
            user_id: text.user_id.clone(),
            title: text.title.clone(),
            content: text.content.clone(),
            text_type: text.text_type.label().to_string(),
            language: text.language.clone(),
            words_used: text.words_used.clone(),
            created_at: text.created_at,
        }
    }
    fn to_domain(self) -> GeneratedText {
        GeneratedText {
            id: record_id(&self.id),
            user_id: self.user_id,
            title: self.title,
            content: self.content,
            text_type: TextType::from_label(&self.text_type),
            language: self.language,
            words_used: self.words_used,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Implements `StorageService` over any `KeyValueStore`.
pub struct LocalStorageAdapter<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> LocalStorageAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> PortResult<Vec<T>> {
        match self.store.get(key)? {
            Some(data) => serde_json::from_str(&data)
                .map_err(|e| PortError::Storage(format!("Corrupt {key} entry: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    fn replace<T: Serialize>(&self, key: &str, records: &[T]) -> PortResult<()> {
        let data = serde_json::to_string(records)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.set(key, &data)
    }
}

impl<S: KeyValueStore> StorageService for LocalStorageAdapter<S> {
    fn get_user(&self) -> PortResult<Option<User>> {
        match self.store.get(USER_KEY)? {
            Some(data) => serde_json::from_str::<UserRecord>(&data)
                .map(|r| Some(r.to_domain()))
                .map_err(|e| PortError::Storage(format!("Corrupt {USER_KEY} entry: {e}"))),
            None => Ok(None),
        }
    }

    fn save_user(&self, user: &User) -> PortResult<()> {
        let data = serde_json::to_string(&UserRecord::from_domain(user))
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.set(USER_KEY, &data)
    }

    fn clear_user(&self) -> PortResult<()> {
        self.store.remove(USER_KEY)
    }

    fn get_words(&self, user_id: &str) -> PortResult<Vec<Word>> {
        let mut words: Vec<Word> = self
            .load::<WordRecord>(WORDS_KEY)?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .map(WordRecord::to_domain)
            .collect();
        words.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(words)
    }

    fn add_word(&self, word: &Word) -> PortResult<()> {
        let mut all = self.load::<WordRecord>(WORDS_KEY)?;
        all.push(WordRecord::from_domain(word));
        self.replace(WORDS_KEY, &all)
    }

    fn delete_word(&self, word_id: Uuid) -> PortResult<()> {
        if self.store.get(WORDS_KEY)?.is_none() {
            return Ok(());
        }
        let mut all = self.load::<WordRecord>(WORDS_KEY)?;
        all.retain(|r| record_id(&r.id) != word_id);
        self.replace(WORDS_KEY, &all)
    }

    fn get_texts(&self, user_id: &str) -> PortResult<Vec<GeneratedText>> {
        let mut texts: Vec<GeneratedText> = self
            .load::<TextRecord>(TEXTS_KEY)?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .map(TextRecord::to_domain)
            .collect();
        texts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(texts)
    }

    fn save_text(&self, text: &GeneratedText) -> PortResult<()> {
        let mut all = self.load::<TextRecord>(TEXTS_KEY)?;
        all.push(TextRecord::from_domain(text));
        self.replace(TEXTS_KEY, &all)
    }

    fn delete_text(&self, text_id: Uuid) -> PortResult<()> {
        if self.store.get(TEXTS_KEY)?.is_none() {
            return Ok(());
        }
        let mut all = self.load::<TextRecord>(TEXTS_KEY)?;
        all.retain(|r| record_id(&r.id) != text_id);
        self.replace(TEXTS_KEY, &all)
    }
}
