//! Forecast error types.

use thiserror::Error;

/// Errors from training or querying forecast models.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Not enough observations to fit a model
    #[error("insufficient data: need {required} points, got {actual}")]
    InsufficientData {
        /// Minimum number of points
        required: usize,
        /// Points supplied
        actual: usize,
    },

    /// No trained model for the ticker
    #[error("no trained model for {0}")]
    NoModel(String),

    /// Model fitting failed
    #[error("training failed: {0}")]
    Training(String),

    /// Model prediction failed
    #[error("prediction failed: {0}")]
    Prediction(String),
}

impl ForecastError {
    /// Creates a `Training` error with a message.
    #[must_use]
    pub fn training(msg: impl Into<String>) -> Self {
        ForecastError::Training(msg.into())
    }

    /// Creates a `Prediction` error with a message.
    #[must_use]
    pub fn prediction(msg: impl Into<String>) -> Self {
        ForecastError::Prediction(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ForecastError::InsufficientData {
            required: 30,
            actual: 12,
        };
        assert_eq!(err.to_string(), "insufficient data: need 30 points, got 12");
        assert_eq!(
            ForecastError::NoModel("AAPL".into()).to_string(),
            "no trained model for AAPL"
        );
    }
}
