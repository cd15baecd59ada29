//! services/api/src/adapters/openai_llm.rs
//!
//! This module contains the OpenAI chat adapter used when the shell talks to
//! the model directly. It implements the `LanguageModelService` port.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use word_pocket_core::ports::{LanguageModelService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `LanguageModelService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter` sampling at temperature 0.7.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self {
            client,
            model,
            temperature: 0.7,
        }
    }
}

//=========================================================================================
// `LanguageModelService` Trait Implementation
//=========================================================================================

#[async_trait]
impl LanguageModelService for OpenAiChatAdapter {
    async fn complete(&self, prompt: &str) -> PortResult<String> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Map the error by hand; `OpenAIError` is foreign to the core crate.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(e.to_string()))?;

        // A response without text parses to the default title and an empty body.
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
