//! Error types for dinecal.

use thiserror::Error;

/// Errors that can occur in dinecal operations.
#[derive(Error, Debug)]
pub enum DineCalError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid timestamp '{0}' (expected YYYY-MM-DDTHH:MM)")]
    InvalidTimestamp(String),

    #[error("Unknown schema version '{0}' (expected v1 or v2)")]
    UnknownSchema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for dinecal operations.
pub type DineCalResult<T> = Result<T, DineCalError>;
