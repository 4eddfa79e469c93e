//! Error Handling
//!
//! Unified error types for the configuration engine.
//! Uses thiserror for ergonomic error definitions.

use summarizer_prompts_core::CoreError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A configuration document failed structural checks
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation would violate a live invariant
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// The key-value store rejected a read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors (paths, compiled-in defaults)
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invariant error
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Store failures all surface as `Storage` so callers can tell a failed
/// write from a rejected document.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Storage(msg) => Self::Storage(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Convert AppError to a string suitable for UI responses
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
