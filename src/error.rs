//! Domain-specific error types for page-pipeline

use thiserror::Error;

/// Main error type for the page generation pipeline.
///
/// Only a few of these abort a run: `MissingField` at ingestion,
/// `RetriesExhausted` from the call client, and `Config`/`Template` at start-up.
/// Everything else that can go wrong with a single generated value is
/// degraded to a fallback at the call site and never surfaces here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PipelineError {
    pub fn template(message: impl Into<String>) -> Self {
        PipelineError::Template {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::Config {
            message: message.into(),
        }
    }

    /// True for the errors that must stop the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingField { .. }
                | PipelineError::RetriesExhausted { .. }
                | PipelineError::Config { .. }
                | PipelineError::Template { .. }
        )
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Config {
            message: format!("TOML parse error: {}", err),
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
