//! Error types for the diagram pipeline
//!
//! The pseudocode-to-UML core never fails. Everything here describes
//! failures of the collaborators around it: the blob store, the LLM
//! translator, the diagram renderer and configuration.

use thiserror::Error;

/// Errors raised by pipeline stages and their collaborators
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{field} not provided")]
    MissingInput { field: &'static str },

    #[error("Invalid encoding for {what}: {message}")]
    InvalidEncoding { what: String, message: String },

    #[error("Blob not found: {key}")]
    NotFound { key: String },

    #[error("Invalid blob key '{key}': {message}")]
    InvalidKey { key: String, message: String },

    #[error("Storage error during {operation} of '{key}': {message}")]
    Storage {
        operation: &'static str,
        key: String,
        message: String,
    },

    #[error("Translation error: {message}")]
    Translate { message: String },

    #[error("API error: status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Create a new missing input error
    pub fn missing_input(field: &'static str) -> Self {
        Self::MissingInput { field }
    }

    /// Create a new encoding error
    pub fn invalid_encoding(what: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidEncoding {
            what: what.into(),
            message: message.to_string(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a new invalid key error
    pub fn invalid_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage(operation: &'static str, key: impl Into<String>, message: impl ToString) -> Self {
        Self::Storage {
            operation,
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a new translation error
    pub fn translate(message: impl ToString) -> Self {
        Self::Translate {
            message: message.to_string(),
        }
    }

    /// Create a new render error
    pub fn render(message: impl ToString) -> Self {
        Self::Render {
            message: message.to_string(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl ToString) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }
}
