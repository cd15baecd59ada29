//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the generation proxy and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use word_pocket_core::domain::{GeneratedContent, GenerationRequest, LengthPreference, TextType};
use word_pocket_core::ports::PortError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_handler,
        health_handler,
    ),
    components(
        schemas(GenerateRequestBody, GenerateResponseBody, HealthResponse)
    ),
    tags(
        (name = "WordPocket API", description = "Generation proxy for vocabulary practice texts.")
    )
)]
pub struct ApiDoc;

/// The served document, stamped with this build's name and version.
pub fn openapi_document() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = "WordPocket generation proxy".to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

fn default_text_type() -> String {
    TextType::default().label().to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_length() -> String {
    LengthPreference::default().as_str().to_string()
}

/// Generation parameters. Every field is optional and falls back to a default.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequestBody {
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(rename = "type", default = "default_text_type")]
    pub text_type: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_length")]
    pub length_preference: String,
}

impl Default for GenerateRequestBody {
    fn default() -> Self {
        Self {
            words: Vec::new(),
            text_type: default_text_type(),
            language: default_language(),
            length_preference: default_length(),
        }
    }
}

impl GenerateRequestBody {
    /// Reads a request body leniently: a missing body, or one that is not
    /// declared as JSON, means "all defaults". Only a declared JSON body that
    /// fails to parse is rejected.
    pub fn from_raw(headers: &HeaderMap, body: &[u8]) -> Result<Self, (StatusCode, String)> {
        let declared_json = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .is_some_and(|mime| mime.trim().to_ascii_lowercase().ends_with("json"));

        if !declared_json || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
    }

    pub fn from_domain(request: &GenerationRequest) -> Self {
        Self {
            words: request.words.clone(),
            text_type: request.text_type.label().to_string(),
            language: request.language.clone(),
            length_preference: request.length.as_str().to_string(),
        }
    }

    /// Anything that is not `short` or `medium` gets the long band.
    pub fn into_domain(self) -> GenerationRequest {
        GenerationRequest {
            words: self.words,
            text_type: TextType::from_label(&self.text_type),
            language: self.language,
            length: LengthPreference::parse(&self.length_preference)
                .unwrap_or(LengthPreference::Long),
        }
    }
}

/// The parsed practice text.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponseBody {
    pub title: String,
    pub content: String,
}

impl GenerateResponseBody {
    pub fn into_domain(self) -> GeneratedContent {
        GeneratedContent {
            title: self.title,
            content: self.content,
        }
    }
}

impl From<GeneratedContent> for GenerateResponseBody {
    fn from(content: GeneratedContent) -> Self {
        Self {
            title: content.title,
            content: content.content,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a practice text that uses the given vocabulary.
///
/// The prompt is built and the model reply is parsed on the server, using the
/// server-held provider credential.
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body = GenerateRequestBody,
    responses(
        (status = 200, description = "Text generated", body = GenerateResponseBody),
        (status = 400, description = "Body declared as JSON but not parseable"),
        (status = 500, description = "Provider error, body is the provider's error text")
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GenerateResponseBody>, (StatusCode, String)> {
    let request = GenerateRequestBody::from_raw(&headers, &body)?.into_domain();
    info!(
        model = %app_state.config.generation_model,
        words = request.words.len(),
        text_type = %request.text_type,
        language = %request.language,
        length = %request.length,
        "Generation requested"
    );

    match app_state.generator.generate_text(&request).await {
        Ok(content) => Ok(Json(content.into())),
        Err(e) => {
            error!("Failed to generate text: {:?}", e);
            let message = match e {
                PortError::Provider(details) => details,
                other => other.to_string(),
            };
            Err((StatusCode::INTERNAL_SERVER_ERROR, message))
        }
    }
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// The API routes without CORS or docs; the binary layers those on.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate", post(generate_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
