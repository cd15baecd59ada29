//! services/api/src/adapters/proxy_client.rs
//!
//! Client side of the generation proxy. Implements `TextGenerationService` by
//! posting the request to `/api/generate`, so the shell never holds a provider key.

use async_trait::async_trait;
use reqwest::Client;
use word_pocket_core::domain::{GeneratedContent, GenerationRequest};
use word_pocket_core::ports::{PortError, PortResult, TextGenerationService};

use crate::web::rest::{GenerateRequestBody, GenerateResponseBody};

#[derive(Debug, Clone)]
pub struct ProxyTextGenerator {
    client: Client,
    base_url: String,
}

impl ProxyTextGenerator {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerationService for ProxyTextGenerator {
    async fn generate_text(&self, request: &GenerationRequest) -> PortResult<GeneratedContent> {
        let response = self
            .client
            .post(self.generate_url())
            .json(&GenerateRequestBody::from_domain(request))
            .send()
            .await
            .map_err(|e| PortError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Provider(format!("proxy returned {status}: {body}")));
        }

        let body: GenerateResponseBody = response
            .json()
            .await
            .map_err(|e| PortError::Provider(format!("Unreadable proxy response: {e}")))?;
        Ok(body.into_domain())
    }
}
