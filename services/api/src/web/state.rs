//! services/api/src/web/state.rs
//!
//! Defines the proxy's shared state.

use crate::config::Config;
use std::sync::Arc;
use word_pocket_core::ports::TextGenerationService;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<dyn TextGenerationService>,
}
