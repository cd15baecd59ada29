//! services/api/src/config.rs
//!
//! Defines the application's configuration structures and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

fn load_dotenv() {
    // Only load from .env in non-test mode to avoid contamination.
    if !cfg!(test) {
        dotenvy::dotenv().ok();
    }
}

fn parse_level(raw: &str) -> Result<Level, ConfigError> {
    raw.parse::<Level>().map_err(|_| {
        ConfigError::InvalidValue(
            "RUST_LOG".to_string(),
            format!("'{}' is not a valid log level", raw),
        )
    })
}

//=========================================================================================
// Proxy Server Configuration
//=========================================================================================

/// Configuration for the generation proxy (`api` binary).
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Sent as-is, even when empty; the provider decides how to reject it.
    pub openrouter_api_key: String,
    pub openrouter_base_url: String,
    pub site_url: String,
    pub generation_model: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3001".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level = parse_level(&var("RUST_LOG").unwrap_or_else(|| "INFO".to_string()))?;

        let openrouter_api_key = var("OPENROUTER_API_KEY").unwrap_or_default();
        let openrouter_base_url = var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string());
        let site_url = var("SITE_URL").unwrap_or_else(|| "http://localhost:3000".to_string());
        let generation_model = var("GENERATION_MODEL")
            .unwrap_or_else(|| "nex-agi/deepseek-v3.1-nex-n1:free".to_string());

        Ok(Self {
            bind_address,
            log_level,
            openrouter_api_key,
            openrouter_base_url,
            site_url,
            generation_model,
        })
    }
}

//=========================================================================================
// Shell Configuration
//=========================================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationMode {
    /// Through the proxy endpoint, keeping provider keys off the client.
    Proxy,
    /// Straight to OpenAI with the client's own key.
    Direct,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DictionaryProvider {
    Free,
    Llm,
}

/// Configuration for the terminal shell (`wordpocket` binary).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub storage_dir: PathBuf,
    pub log_level: Level,
    pub proxy_url: String,
    pub generation_mode: GenerationMode,
    pub dictionary_provider: DictionaryProvider,
    pub dictionary_api_base: String,
    pub openai_api_key: Option<String>,
    pub direct_model: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_dir = var("WORDPOCKET_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./.wordpocket"));

        let log_level = parse_level(&var("RUST_LOG").unwrap_or_else(|| "WARN".to_string()))?;

        let proxy_url = var("WORDPOCKET_PROXY_URL")
            .unwrap_or_else(|| "http://localhost:3001".to_string());

        let generation_mode = match var("GENERATION_MODE").as_deref().map(str::to_lowercase) {
            None => GenerationMode::Proxy,
            Some(mode) if mode == "proxy" => GenerationMode::Proxy,
            Some(mode) if mode == "direct" => GenerationMode::Direct,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "GENERATION_MODE".to_string(),
                    format!("'{}' is not one of proxy, direct", other),
                ))
            }
        };

        let dictionary_provider = match var("DICTIONARY_PROVIDER").as_deref().map(str::to_lowercase) {
            None => DictionaryProvider::Free,
            Some(p) if p == "free" => DictionaryProvider::Free,
            Some(p) if p == "llm" => DictionaryProvider::Llm,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "DICTIONARY_PROVIDER".to_string(),
                    format!("'{}' is not one of free, llm", other),
                ))
            }
        };

        let dictionary_api_base = var("DICTIONARY_API_BASE")
            .unwrap_or_else(|| "https://api.dictionaryapi.dev/api/v2/entries".to_string());

        // --- Load API Keys (as optional) ---
        let openai_api_key = var("OPENAI_API_KEY").filter(|k| !k.is_empty());
        let needs_openai = generation_mode == GenerationMode::Direct
            || dictionary_provider == DictionaryProvider::Llm;
        if needs_openai && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY".to_string()));
        }

        let direct_model = var("DIRECT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        Ok(Self {
            storage_dir,
            log_level,
            proxy_url,
            generation_mode,
            dictionary_provider,
            dictionary_api_base,
            openai_api_key,
            direct_model,
        })
    }
}
