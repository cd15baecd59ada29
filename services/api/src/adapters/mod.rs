pub mod dictionary;
pub mod openai_llm;
pub mod openrouter_llm;
pub mod proxy_client;
pub mod storage;

pub use dictionary::{FreeDictionaryAdapter, LlmDictionaryAdapter};
pub use openai_llm::OpenAiChatAdapter;
pub use openrouter_llm::OpenRouterAdapter;
pub use proxy_client::ProxyTextGenerator;
pub use storage::{FileKeyValueStore, KeyValueStore, LocalStorageAdapter, MemoryKeyValueStore};
