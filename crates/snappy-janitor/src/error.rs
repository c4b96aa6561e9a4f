//! Error types for Janitor operations

use thiserror::Error;

/// Errors that can occur during Janitor operations
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// A snapshot name could not be built
    #[error("Invalid snapshot name: {0}")]
    InvalidName(String),

    /// Worker error (scheduling issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
