//! Core Error Types
//!
//! Errors raised by key-value store implementations. These are dependency-free
//! (only thiserror + std + serde_json) to keep the core crate lightweight.
//!
//! The main crate extends these with the configuration-level variants
//! (Validation, Invariant, NotFound).

use thiserror::Error;

/// Core error type for store adapters.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The underlying store rejected a read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
