//! services/api/src/adapters/openrouter_llm.rs
//!
//! The hosted-model adapter used by the generation proxy. Talks to any
//! OpenAI-compatible `/chat/completions` endpoint with the server-held key.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;
use word_pocket_core::ports::{LanguageModelService, PortError, PortResult};

const APP_TITLE: &str = "WordPocket";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenRouterAdapter {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    site_url: String,
}

impl OpenRouterAdapter {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            site_url: site_url.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModelService for OpenRouterAdapter {
    async fn complete(&self, prompt: &str) -> PortResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", APP_TITLE)
            .json(&request)
            .send()
            .await
            .map_err(|e| PortError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // The provider's own error text is passed through to the caller.
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Model provider rejected the request");
            return Err(PortError::Provider(body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PortError::Provider(format!("Unreadable provider response: {e}")))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}
