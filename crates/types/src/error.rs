//! Core error types.

use thiserror::Error;

/// Core error types for tickwatch
#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller supplied malformed input (missing columns, unordered timestamps, ...)
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates a `ContractViolation` with a message.
    #[must_use]
    pub fn contract(msg: impl Into<String>) -> Self {
        CoreError::ContractViolation(msg.into())
    }

    /// Creates a `Config` error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        CoreError::Config(msg.into())
    }
}
