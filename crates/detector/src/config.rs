//! Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tickwatch_types::{CoreError, DetectorConfig, ForecastConfig, LoggingConfig};

use crate::ensemble::EnsembleWeights;
use crate::error::DetectError;

/// Complete configuration for a detector process.
///
/// Every section defaults independently, so `{}` is a valid document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Rule thresholds
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Forecaster settings
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Ensemble score weights
    #[serde(default)]
    pub weights: EnsembleWeights,
    /// Logging setup
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parses a JSON document and validates it.
    ///
    /// # Errors
    /// [`CoreError::Json`] for malformed input, [`CoreError::Config`] for
    /// out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON file, then applies environment overrides.
    ///
    /// # Errors
    /// I/O, parse and validation failures.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DetectError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&raw)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    ///
    /// # Errors
    /// [`CoreError::Config`] when a variable does not parse or the result is
    /// out of range.
    pub fn from_env() -> Result<Self, CoreError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides to every section.
    ///
    /// # Errors
    /// [`CoreError::Config`] when a variable does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), CoreError> {
        self.detector.apply_env_overrides()?;
        self.forecast.apply_env_overrides()?;
        self.logging.apply_env_overrides()
    }

    /// Validates every section.
    ///
    /// # Errors
    /// [`CoreError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.detector.validate()?;
        self.forecast.validate()?;
        self.weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_relative_eq!(config.detector.zscore_threshold, 3.0);
        assert_eq!(config.forecast.max_model_age_hours, 24);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_json_str(
            r#"{"detector": {"zscore_threshold": 2.5}, "logging": {"json": true}}"#,
        )
        .unwrap();

        assert_relative_eq!(config.detector.zscore_threshold, 2.5);
        assert_eq!(config.detector.lookback_period, 20);
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err =
            AppConfig::from_json_str(r#"{"detector": {"zscore_threshold": -1.0}}"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));

        let err = AppConfig::from_json_str(r#"{"weights": {"fallback": -1.0}}"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            AppConfig::from_json_str("{not json"),
            Err(CoreError::Json(_))
        ));
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("ZSCORE_THRESHOLD", Some("2.0")),
                ("VOLATILITY_PERCENTILE", Some("90")),
                ("FORECAST_CONFIDENCE_LEVEL", Some("0.8")),
                ("MODEL_MAX_AGE_HOURS", Some("6")),
                ("LOG_LEVEL", Some("DEBUG")),
            ],
            || {
                let config = AppConfig::from_env().unwrap();
                assert_relative_eq!(config.detector.zscore_threshold, 2.0);
                assert_eq!(config.detector.volatility_percentile, 90);
                assert_relative_eq!(config.forecast.confidence_level, 0.8);
                assert_eq!(config.forecast.max_model_age_hours, 6);
                assert_eq!(config.logging.level, "debug");
            },
        );
    }

    #[test]
    fn test_from_env_unparsable() {
        temp_env::with_var("ZSCORE_THRESHOLD", Some("high"), || {
            assert!(matches!(AppConfig::from_env(), Err(CoreError::Config(_))));
        });
    }
}
