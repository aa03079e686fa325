//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading the targets document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON content.
    #[error("Unable to load configuration from '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A required key is absent.
    #[error("'{key}' key not found. Please make sure to provide '{key_path}' in '{path}'")]
    MissingKey {
        path: String,
        key: String,
        key_path: String,
    },

    /// A value is present but invalid.
    #[error("Validation error in '{path}' at '{key_path}': {message}")]
    ValidationError {
        path: String,
        key_path: String,
        message: String,
    },

    /// The run mode is neither `dev` nor `prod`.
    #[error("Invalid mode '{value}'. Supported modes are 'dev' and 'prod'")]
    InvalidMode { value: String },

    /// Missing required file.
    #[error("Configuration file '{path}' not found")]
    MissingFile { path: String },
}
