//! Configuration consumed by the detector, forecaster and logging setup.
//!
//! Every field has a serde default, so a partial JSON document (or none at
//! all) yields the stock thresholds. Environment overrides mirror the
//! variable names used by the deployment scripts.

use std::str::FromStr;

use crate::error::CoreError;

/// Detection thresholds and rule constants.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetectorConfig {
    /// |z| above which the latest close is anomalous
    #[serde(default = "default_zscore_threshold")]
    pub zscore_threshold: f64,
    /// Percentile of historical ATR that marks a volatility spike
    #[serde(default = "default_volatility_percentile")]
    pub volatility_percentile: u32,
    /// RSI level for overbought
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,
    /// RSI level for oversold
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,
    /// Rolling window for the z-score baseline
    #[serde(default = "default_lookback_period")]
    pub lookback_period: usize,
    /// RSI period
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    /// ATR period
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    /// Bollinger Bands period
    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,
    /// Bollinger Bands width in standard deviations
    #[serde(default = "default_bollinger_std_dev")]
    pub bollinger_std_dev: f64,
    /// Minimum bars before the volatility rule runs
    #[serde(default = "default_long_history")]
    pub volatility_min_history: usize,
    /// Minimum bars before the forecast rule runs
    #[serde(default = "default_long_history")]
    pub forecast_min_history: usize,
    /// Forecast deviation (in percent) that maps to severity 1.0
    #[serde(default = "default_forecast_saturation_pct")]
    pub forecast_saturation_pct: f64,
    /// Z-score severity above which the alert is critical
    #[serde(default = "default_zscore_critical_severity")]
    pub zscore_critical_severity: f64,
    /// Volatility severity from which the alert is critical
    #[serde(default = "default_half")]
    pub volatility_critical_severity: f64,
    /// Forecast severity above which the alert is critical
    #[serde(default = "default_half")]
    pub forecast_critical_severity: f64,
}

fn default_zscore_threshold() -> f64 {
    3.0
}
fn default_volatility_percentile() -> u32 {
    95
}
fn default_rsi_overbought() -> f64 {
    70.0
}
fn default_rsi_oversold() -> f64 {
    30.0
}
fn default_lookback_period() -> usize {
    20
}
fn default_rsi_period() -> usize {
    14
}
fn default_atr_period() -> usize {
    14
}
fn default_bollinger_period() -> usize {
    20
}
fn default_bollinger_std_dev() -> f64 {
    2.0
}
fn default_long_history() -> usize {
    30
}
fn default_forecast_saturation_pct() -> f64 {
    10.0
}
fn default_zscore_critical_severity() -> f64 {
    0.7
}
fn default_half() -> f64 {
    0.5
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            zscore_threshold: default_zscore_threshold(),
            volatility_percentile: default_volatility_percentile(),
            rsi_overbought: default_rsi_overbought(),
            rsi_oversold: default_rsi_oversold(),
            lookback_period: default_lookback_period(),
            rsi_period: default_rsi_period(),
            atr_period: default_atr_period(),
            bollinger_period: default_bollinger_period(),
            bollinger_std_dev: default_bollinger_std_dev(),
            volatility_min_history: default_long_history(),
            forecast_min_history: default_long_history(),
            forecast_saturation_pct: default_forecast_saturation_pct(),
            zscore_critical_severity: default_zscore_critical_severity(),
            volatility_critical_severity: default_half(),
            forecast_critical_severity: default_half(),
        }
    }
}

impl DetectorConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.zscore_threshold.is_finite() && self.zscore_threshold > 0.0) {
            return Err(CoreError::config(format!(
                "zscore_threshold must be positive, got {}",
                self.zscore_threshold
            )));
        }
        if self.volatility_percentile > 100 {
            return Err(CoreError::config(format!(
                "volatility_percentile must be within 0..=100, got {}",
                self.volatility_percentile
            )));
        }
        if !(self.rsi_oversold > 0.0
            && self.rsi_oversold < self.rsi_overbought
            && self.rsi_overbought < 100.0)
        {
            return Err(CoreError::config(format!(
                "rsi thresholds must satisfy 0 < oversold < overbought < 100, got {}/{}",
                self.rsi_oversold, self.rsi_overbought
            )));
        }
        if self.lookback_period < 2 {
            return Err(CoreError::config(format!(
                "lookback_period must be at least 2, got {}",
                self.lookback_period
            )));
        }
        for (name, period) in [
            ("rsi_period", self.rsi_period),
            ("atr_period", self.atr_period),
            ("bollinger_period", self.bollinger_period),
        ] {
            if period == 0 {
                return Err(CoreError::config(format!("{name} must be positive")));
            }
        }
        if !(self.bollinger_std_dev.is_finite() && self.bollinger_std_dev >= 0.0) {
            return Err(CoreError::config(format!(
                "bollinger_std_dev must be non-negative, got {}",
                self.bollinger_std_dev
            )));
        }
        if !(self.forecast_saturation_pct.is_finite() && self.forecast_saturation_pct > 0.0) {
            return Err(CoreError::config(format!(
                "forecast_saturation_pct must be positive, got {}",
                self.forecast_saturation_pct
            )));
        }
        Ok(())
    }

    /// Applies `ZSCORE_THRESHOLD`, `VOLATILITY_PERCENTILE`, `RSI_OVERBOUGHT`,
    /// `RSI_OVERSOLD` and `LOOKBACK_PERIOD` when set.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] when a variable is set but unparsable.
    pub fn apply_env_overrides(&mut self) -> Result<(), CoreError> {
        if let Some(v) = env_override("ZSCORE_THRESHOLD")? {
            self.zscore_threshold = v;
        }
        if let Some(v) = env_override("VOLATILITY_PERCENTILE")? {
            self.volatility_percentile = v;
        }
        if let Some(v) = env_override("RSI_OVERBOUGHT")? {
            self.rsi_overbought = v;
        }
        if let Some(v) = env_override("RSI_OVERSOLD")? {
            self.rsi_oversold = v;
        }
        if let Some(v) = env_override("LOOKBACK_PERIOD")? {
            self.lookback_period = v;
        }
        Ok(())
    }
}

/// Forecaster settings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForecastConfig {
    /// Width of the forecast confidence interval
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// Age after which a cached model is retrained before use
    #[serde(default = "default_max_model_age_hours")]
    pub max_model_age_hours: u64,
    /// Minimum bars needed to train a model
    #[serde(default = "default_long_history")]
    pub min_training_points: usize,
    /// Fit a day-of-week seasonal profile
    #[serde(default = "default_true")]
    pub weekly_seasonality: bool,
}

fn default_confidence_level() -> f64 {
    0.95
}
fn default_max_model_age_hours() -> u64 {
    24
}
fn default_true() -> bool {
    true
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            confidence_level: default_confidence_level(),
            max_model_age_hours: default_max_model_age_hours(),
            min_training_points: default_long_history(),
            weekly_seasonality: true,
        }
    }
}

impl ForecastConfig {
    /// Maximum model age as a duration.
    #[must_use]
    pub fn max_model_age(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.max_model_age_hours.saturating_mul(3_600))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(CoreError::config(format!(
                "confidence_level must be within (0, 1), got {}",
                self.confidence_level
            )));
        }
        if self.min_training_points < 2 {
            return Err(CoreError::config(format!(
                "min_training_points must be at least 2, got {}",
                self.min_training_points
            )));
        }
        Ok(())
    }

    /// Applies `FORECAST_CONFIDENCE_LEVEL` and `MODEL_MAX_AGE_HOURS` when set.
    /// The legacy `PROPHET_CONFIDENCE_LEVEL` is read when the new name is
    /// absent.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] when a variable is set but unparsable.
    pub fn apply_env_overrides(&mut self) -> Result<(), CoreError> {
        let confidence = match env_override("FORECAST_CONFIDENCE_LEVEL")? {
            Some(v) => Some(v),
            None => env_override("PROPHET_CONFIDENCE_LEVEL")?,
        };
        if let Some(v) = confidence {
            self.confidence_level = v;
        }
        if let Some(v) = env_override("MODEL_MAX_AGE_HOURS")? {
            self.max_model_age_hours = v;
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoggingConfig {
    /// Default level filter (`RUST_LOG` takes precedence)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Applies `LOG_LEVEL` and `LOG_JSON` when set.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] when `LOG_JSON` is not a boolean.
    pub fn apply_env_overrides(&mut self) -> Result<(), CoreError> {
        if let Some(level) = env_override::<String>("LOG_LEVEL")? {
            self.level = level.to_lowercase();
        }
        if let Some(json) = env_override("LOG_JSON")? {
            self.json = json;
        }
        Ok(())
    }
}

/// Reads and parses an environment variable.
///
/// Returns `Ok(None)` when the variable is unset or blank.
///
/// # Errors
/// Returns [`CoreError::Config`] when the value does not parse as `T`.
pub fn env_override<T>(key: &str) -> Result<Option<T>, CoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CoreError::config(format!("{key}={raw:?}: {e}"))),
        _ => Ok(None),
    }
}
