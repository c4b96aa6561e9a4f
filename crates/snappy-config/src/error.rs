//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML config is malformed
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// sanoid.conf syntax error
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// One-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// `use_template` names a template section that does not exist
    #[error("Template '{template}' referenced by '{section}' not found")]
    MissingTemplate {
        /// Template name as written in `use_template`
        template: String,
        /// Section referencing it
        section: String,
    },

    /// No section for the requested dataset
    #[error("Dataset '{0}' not found in configuration")]
    UnknownDataset(String),

    /// A value has the wrong type or range
    #[error("Invalid value for '{key}' in [{section}]: '{value}'")]
    InvalidValue {
        /// Section holding the key
        section: String,
        /// Key name
        key: String,
        /// Offending value
        value: String,
    },

    /// Snapshot prefix is empty or contains characters outside `[A-Za-z0-9_.:-]`
    #[error("Invalid snapshot prefix: '{0}'")]
    InvalidPrefix(String),
}
