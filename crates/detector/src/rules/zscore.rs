//! Z-score deviation of the latest close.

use tickwatch_indicators::stats::mean_std;
use tickwatch_types::{AlertPriority, Anomaly, AnomalyType, DetectorConfig, PriceSeries};

use super::{DetectionRule, latest};
use crate::error::DetectError;

/// Flags a latest close more than `threshold` sample standard deviations
/// away from the mean of the preceding `lookback` closes.
///
/// A flat baseline with a different close counts as an infinite z-score.
#[derive(Debug, Clone)]
pub struct ZScoreRule {
    /// |z| trigger level
    pub threshold: f64,
    /// Baseline window length
    pub lookback: usize,
    /// Severity above which the alert is critical
    pub critical_severity: f64,
}

impl ZScoreRule {
    /// Creates the rule.
    #[must_use]
    pub fn new(threshold: f64, lookback: usize, critical_severity: f64) -> Self {
        Self {
            threshold,
            lookback,
            critical_severity,
        }
    }

    /// Creates the rule from detector configuration.
    #[must_use]
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            config.zscore_threshold,
            config.lookback_period,
            config.zscore_critical_severity,
        )
    }
}

impl DetectionRule for ZScoreRule {
    fn anomaly_type(&self) -> AnomalyType {
        AnomalyType::Zscore
    }

    fn min_history(&self) -> usize {
        self.lookback.max(2)
    }

    fn evaluate(&self, series: &PriceSeries, ticker: &str) -> Result<Vec<Anomaly>, DetectError> {
        if !self.has_history(series) {
            return Ok(vec![]);
        }
        let Some((close, timestamp_ns)) = latest(series) else {
            return Ok(vec![]);
        };

        let closes = series.closes();
        let end = closes.len() - 1;
        let start = end.saturating_sub(self.lookback);
        let (mean, std) = mean_std(&closes[start..end], 1);

        if std.is_nan() || (std == 0.0 && close == mean) {
            return Ok(vec![]);
        }
        let z = if std == 0.0 {
            (close - mean).signum() * f64::INFINITY
        } else {
            (close - mean) / std
        };

        if z.abs() <= self.threshold {
            return Ok(vec![]);
        }

        let severity = (z.abs() / (2.0 * self.threshold)).min(1.0);
        let priority = if severity > self.critical_severity {
            AlertPriority::Critical
        } else {
            AlertPriority::Warning
        };
        let direction = if z > 0.0 { "above" } else { "below" };
        let magnitude = if z.is_finite() {
            format!("{:.1}σ", z.abs())
        } else {
            "∞σ".to_string()
        };

        Ok(vec![Anomaly::new(
            ticker,
            timestamp_ns,
            AnomalyType::Zscore,
            severity,
            close,
            Some(mean),
            format!("Price is {magnitude} {direction} the rolling mean"),
            priority,
        )])
    }
}
