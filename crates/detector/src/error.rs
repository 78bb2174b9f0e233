//! Detector error types.

use thiserror::Error;
use tickwatch_forecast::ForecastError;
use tickwatch_types::CoreError;

/// Errors raised by detection rules and the command-line front end.
#[derive(Debug, Error)]
pub enum DetectError {
    /// An external collaborator (the forecaster) failed or returned unusable data
    #[error("collaborator failure: {0}")]
    Collaborator(String),

    /// Core contract or configuration error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DetectError {
    /// Creates a `Collaborator` error with a message.
    #[must_use]
    pub fn collaborator(msg: impl Into<String>) -> Self {
        DetectError::Collaborator(msg.into())
    }
}

impl From<ForecastError> for DetectError {
    fn from(err: ForecastError) -> Self {
        DetectError::Collaborator(format!("forecast: {err}"))
    }
}
