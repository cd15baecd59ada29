//! services/api/src/bin/api.rs
//!
//! The generation proxy server.

use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa_swagger_ui::SwaggerUi;
use word_pocket_core::generation::LlmTextGenerator;
use wordpocket_lib::{
    adapters::OpenRouterAdapter,
    config::Config,
    error::ApiError,
    web::{build_router, rest::openapi_document, state::AppState},
};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Model Provider ---
    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;
    let model = Arc::new(OpenRouterAdapter::new(
        http,
        config.openrouter_base_url.clone(),
        config.openrouter_api_key.clone(),
        config.generation_model.clone(),
        config.site_url.clone(),
    ));
    info!(model = %config.generation_model, "Using hosted model provider");

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        generator: Arc::new(LlmTextGenerator::new(model)),
    });

    let site_origin = config.site_url.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("SITE_URL is not a valid origin: {}", e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(site_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(build_router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi_document()));

    // --- 5. Start the Server ---
    info!("API server listening on http://{}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
