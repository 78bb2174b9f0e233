//! Bollinger Band breakout of the latest close.

use tickwatch_indicators::{BollingerBands, MultiOutputIndicator};
use tickwatch_types::{AlertPriority, Anomaly, AnomalyType, DetectorConfig, PriceSeries};

use super::{DetectionRule, latest};
use crate::error::DetectError;

/// Flags a latest close strictly outside the Bollinger Bands.
///
/// Severity is the distance past the breached band relative to the middle
/// band, scaled by 10 and capped at 1.
#[derive(Debug, Clone)]
pub struct BollingerBreakoutRule {
    /// Band period
    pub period: usize,
    /// Band width in standard deviations
    pub std_dev: f64,
}

impl BollingerBreakoutRule {
    /// Creates the rule.
    #[must_use]
    pub fn new(period: usize, std_dev: f64) -> Self {
        Self { period, std_dev }
    }

    /// Creates the rule from detector configuration.
    #[must_use]
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.bollinger_period, config.bollinger_std_dev)
    }
}

impl DetectionRule for BollingerBreakoutRule {
    fn anomaly_type(&self) -> AnomalyType {
        AnomalyType::BollingerBreakout
    }

    fn min_history(&self) -> usize {
        BollingerBands::new(self.period, self.std_dev).warmup_periods()
    }

    fn evaluate(&self, series: &PriceSeries, ticker: &str) -> Result<Vec<Anomaly>, DetectError> {
        if !self.has_history(series) {
            return Ok(vec![]);
        }
        let Some((close, timestamp_ns)) = latest(series) else {
            return Ok(vec![]);
        };

        let bands = BollingerBands::new(self.period, self.std_dev).compute_all(series.points());
        let (Some(&upper), Some(&middle), Some(&lower)) =
            (bands.upper.last(), bands.middle.last(), bands.lower.last())
        else {
            return Ok(vec![]);
        };
        if !(upper.is_finite() && middle.is_finite() && lower.is_finite()) {
            return Ok(vec![]);
        }

        let (band, description) = if close > upper {
            (upper, format!("Price broke above upper Bollinger Band (${upper:.2})"))
        } else if close < lower {
            (lower, format!("Price broke below lower Bollinger Band (${lower:.2})"))
        } else {
            return Ok(vec![]);
        };

        let severity = if middle == 0.0 {
            1.0
        } else {
            ((close - band).abs() / middle.abs() * 10.0).min(1.0)
        };

        Ok(vec![Anomaly::new(
            ticker,
            timestamp_ns,
            AnomalyType::BollingerBreakout,
            severity,
            close,
            Some(band),
            description,
            AlertPriority::Warning,
        )])
    }
}
