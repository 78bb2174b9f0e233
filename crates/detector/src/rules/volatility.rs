//! Volatility spike: latest ATR against its own history.

use tickwatch_indicators::stats::quantile;
use tickwatch_indicators::{Atr, Indicator};
use tickwatch_types::{AlertPriority, Anomaly, AnomalyType, DetectorConfig, PriceSeries};

use super::{DetectionRule, latest};
use crate::error::DetectError;

/// Flags a latest ATR above the given percentile of all defined ATR values
/// of the series.
#[derive(Debug, Clone)]
pub struct VolatilitySpikeRule {
    /// ATR period
    pub atr_period: usize,
    /// Percentile (0..=100) used as the threshold
    pub percentile: u32,
    /// Minimum bars before the rule runs
    pub min_history: usize,
    /// Severity from which the alert is critical
    pub critical_severity: f64,
}

impl VolatilitySpikeRule {
    /// Creates the rule.
    #[must_use]
    pub fn new(
        atr_period: usize,
        percentile: u32,
        min_history: usize,
        critical_severity: f64,
    ) -> Self {
        Self {
            atr_period,
            percentile,
            min_history,
            critical_severity,
        }
    }

    /// Creates the rule from detector configuration.
    #[must_use]
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            config.atr_period,
            config.volatility_percentile,
            config.volatility_min_history,
            config.volatility_critical_severity,
        )
    }
}

impl DetectionRule for VolatilitySpikeRule {
    fn anomaly_type(&self) -> AnomalyType {
        AnomalyType::VolatilitySpike
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

        let atr = Atr::new(self.atr_period).compute(series.points());
        let current = atr.last().copied().unwrap_or(f64::NAN);
        let Some(threshold) = quantile(&atr, f64::from(self.percentile) / 100.0) else {
            return Ok(vec![]);
        };
        if !current.is_finite() || current <= threshold {
            return Ok(vec![]);
        }

        let severity = if threshold > 0.0 {
            ((current - threshold) / threshold).min(1.0)
        } else {
            1.0
        };
        let priority = if severity < self.critical_severity {
            AlertPriority::Warning
        } else {
            AlertPriority::Critical
        };

        Ok(vec![Anomaly::new(
            ticker,
            timestamp_ns,
            AnomalyType::VolatilitySpike,
            severity,
            close,
            None,
            format!(
                "ATR ({current:.2}) exceeds {}th percentile ({threshold:.2})",
                self.percentile
            ),
            priority,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{BASE_TS, DAY_NS};
    use approx::assert_relative_eq;
    use tickwatch_types::PricePoint;

    fn bar(i: i64, range: f64) -> PricePoint {
        PricePoint {
            timestamp_ns: BASE_TS + i * DAY_NS,
            open: 100.0,
            high: 100.0 + range / 2.0,
            low: 100.0 - range / 2.0,
            close: 100.0,
            volume: 1_000.0,
        }
    }

    fn rule() -> VolatilitySpikeRule {
        VolatilitySpikeRule::new(14, 95, 30, 0.5)
    }

    #[test]
    fn test_short_series_is_empty() {
        let bars: Vec<PricePoint> =
            (0..29).map(|i| bar(i, if i == 28 { 50.0 } else { 1.0 })).collect();
        let series = PriceSeries::new(bars).unwrap();

        assert!(rule().evaluate(&series, "AAPL").unwrap().is_empty());
    }

    #[test]
    fn test_constant_range_is_quiet() {
        let bars: Vec<PricePoint> = (0..40).map(|i| bar(i, 2.0)).collect();
        let series = PriceSeries::new(bars).unwrap();

        assert!(rule().evaluate(&series, "AAPL").unwrap().is_empty());
    }

    #[test]
    fn test_range_expansion_is_critical() {
        let bars: Vec<PricePoint> =
            (0..40).map(|i| bar(i, if i == 39 { 100.0 } else { 1.0 })).collect();
        let series = PriceSeries::new(bars).unwrap();
        let anomalies = rule().evaluate(&series, "AAPL").unwrap();

        assert_eq!(anomalies.len(), 1);
        let a = &anomalies[0];
        assert_eq!(a.anomaly_type(), AnomalyType::VolatilitySpike);
        assert_relative_eq!(a.severity(), 1.0);
        assert_eq!(a.priority(), AlertPriority::Critical);
        assert!(a.expected_price().is_none());
        assert!(a.description().starts_with("ATR ("));
        assert!(a.description().contains("exceeds 95th percentile"));
    }

    #[test]
    fn test_mild_expansion_is_warning() {
        // last ATR slightly above the interpolated 95th percentile
        let bars: Vec<PricePoint> =
            (0..40).map(|i| bar(i, if i == 39 { 2.4 } else { 1.0 })).collect();
        let series = PriceSeries::new(bars).unwrap();
        let anomalies = rule().evaluate(&series, "AAPL").unwrap();

        assert_eq!(anomalies.len(), 1);
        let a = &anomalies[0];
        // ATR values: 26 x 1.0 then 1.1, so the 95th percentile is still 1.0
        assert_relative_eq!(a.severity(), 0.1, epsilon = 1e-9);
        assert_eq!(a.priority(), AlertPriority::Warning);
    }
}
