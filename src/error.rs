//! Error types for the explica crate

use thiserror::Error;

/// Top-level error type for classification and attribution operations
#[derive(Debug, Error)]
pub enum ExplicaError {
    /// Underlying model failed to load; fatal to the adapter instance
    #[error("Model initialization error: {0}")]
    ModelInit(String),

    /// Zero-shot scoring failed; recoverable inside `predict` via fallback
    #[error("Zero-shot scoring error: {0}")]
    ZeroShot(String),

    /// Model tokenizer unavailable; recoverable via whitespace tokenization
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Attribution computation failed; recoverable via the degraded result
    #[error("Attribution error: {0}")]
    Attribution(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ExplicaError {
    fn from(err: serde_json::Error) -> Self {
        ExplicaError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for ExplicaError {
    fn from(err: serde_yaml::Error) -> Self {
        ExplicaError::Serialization(err.to_string())
    }
}

/// Result type alias for explica operations
pub type Result<T> = std::result::Result<T, ExplicaError>;
