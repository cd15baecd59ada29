//! services/api/src/error.rs
//!
//! Defines the primary error type for the WordPocket binaries.

use crate::config::ConfigError;
use crate::shell::ShellError;
use word_pocket_core::ports::PortError;

/// The primary error type for the `wordpocket` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error raised by a shell action.
    #[error("{0}")]
    Shell(#[from] ShellError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
