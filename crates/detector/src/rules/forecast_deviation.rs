//! Latest close outside the forecast interval.

use std::sync::Arc;

use tickwatch_forecast::ForecastSource;
use tickwatch_types::{
    AlertPriority, Anomaly, AnomalyType, DetectorConfig, ForecastResult, PriceSeries,
};

use super::{DetectionRule, latest};
use crate::error::DetectError;

/// Flags a latest close outside the confidence interval of the forecast for
/// the period after the series.
///
/// Severity is the percentage distance past the breached bound divided by
/// `saturation_pct`, capped at 1.
pub struct ForecastDeviationRule {
    source: Arc<dyn ForecastSource>,
    /// Minimum bars before the rule runs
    pub min_history: usize,
    /// Deviation percentage that maps to severity 1.0
    pub saturation_pct: f64,
    /// Severity above which the alert is critical
    pub critical_severity: f64,
}

impl ForecastDeviationRule {
    /// Creates the rule.
    #[must_use]
    pub fn new(
        source: Arc<dyn ForecastSource>,
        min_history: usize,
        saturation_pct: f64,
        critical_severity: f64,
    ) -> Self {
        Self {
            source,
            min_history,
            saturation_pct,
            critical_severity,
        }
    }

    /// Creates the rule from detector configuration.
    #[must_use]
    pub fn from_config(source: Arc<dyn ForecastSource>, config: &DetectorConfig) -> Self {
        Self::new(
            source,
            config.forecast_min_history,
            config.forecast_saturation_pct,
            config.forecast_critical_severity,
        )
    }
}

fn validate_forecast(forecast: &ForecastResult) -> Result<(), DetectError> {
    let ForecastResult {
        predicted,
        lower_bound,
        upper_bound,
    } = *forecast;

    if !(predicted.is_finite() && lower_bound.is_finite() && upper_bound.is_finite()) {
        return Err(DetectError::collaborator(format!(
            "non-finite forecast: {forecast:?}"
        )));
    }
    if lower_bound > upper_bound {
        return Err(DetectError::collaborator(format!(
            "inverted forecast interval: {lower_bound} > {upper_bound}"
        )));
    }
    if predicted == 0.0 {
        return Err(DetectError::collaborator("forecast predicted a zero price"));
    }
    Ok(())
}

impl std::fmt::Debug for ForecastDeviationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastDeviationRule")
            .field("min_history", &self.min_history)
            .field("saturation_pct", &self.saturation_pct)
            .field("critical_severity", &self.critical_severity)
            .finish_non_exhaustive()
    }
}

impl DetectionRule for ForecastDeviationRule {
    fn anomaly_type(&self) -> AnomalyType {
        AnomalyType::ProphetDeviation
    }

    fn min_history(&self) -> usize {
        self.min_history
    }

    fn evaluate(&self, series: &PriceSeries, ticker: &str) -> Result<Vec<Anomaly>, DetectError> {
        if !self.has_history(series) {
            return Ok(vec![]);
        }
        let Some((close, timestamp_ns)) = latest(series) else {
            return Ok(vec![]);
        };

        let Some(forecast) = self.source.current_forecast(ticker, series)? else {
            return Ok(vec![]);
        };
        validate_forecast(&forecast)?;

        let Some(deviation) = self.source.check_deviation(ticker, close, &forecast) else {
            return Ok(vec![]);
        };

        let severity = (deviation.deviation_pct / self.saturation_pct).min(1.0);
        let priority = if severity > self.critical_severity {
            AlertPriority::Critical
        } else {
            AlertPriority::Warning
        };

        Ok(vec![Anomaly::new(
            ticker,
            timestamp_ns,
            AnomalyType::ProphetDeviation,
            severity,
            close,
            Some(forecast.predicted),
            format!(
                "Price {:.1}% {} forecast",
                deviation.deviation_pct,
                deviation.direction.as_str()
            ),
            priority,
        )])
    }
}
