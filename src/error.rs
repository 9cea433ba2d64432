//! Error types for LikeLines

use thiserror::Error;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed aggregate: {0}")]
    MalformedInput(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse analyzer output: {0}")]
    ParseError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<crate::schema::ValidationError> for ComputeError {
    fn from(e: crate::schema::ValidationError) -> Self {
        ComputeError::MalformedInput(e.to_string())
    }
}
