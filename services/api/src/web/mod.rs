pub mod rest;
pub mod state;

// Re-export the handlers and router so the binaries can build the server.
pub use rest::{build_router, generate_handler, health_handler};
