//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] snappy_config::ConfigError),

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] snappy_store::StoreError),

    /// Janitor error
    #[error("{0}")]
    Janitor(#[from] snappy_janitor::JanitorError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
