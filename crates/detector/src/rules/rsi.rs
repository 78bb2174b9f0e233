//! RSI overbought / oversold.

use tickwatch_indicators::{Indicator, Rsi};
use tickwatch_types::{AlertPriority, Anomaly, AnomalyType, DetectorConfig, PriceSeries};

use super::{DetectionRule, latest};
use crate::error::DetectError;

/// Flags a latest RSI above `overbought` or below `oversold`.
#[derive(Debug, Clone)]
pub struct RsiExtremeRule {
    /// RSI period
    pub period: usize,
    /// Overbought level
    pub overbought: f64,
    /// Oversold level
    pub oversold: f64,
}

impl RsiExtremeRule {
    /// Creates the rule.
    #[must_use]
    pub fn new(period: usize, overbought: f64, oversold: f64) -> Self {
        Self {
            period,
            overbought,
            oversold,
        }
    }

    /// Creates the rule from detector configuration.
    #[must_use]
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.rsi_period, config.rsi_overbought, config.rsi_oversold)
    }
}

impl DetectionRule for RsiExtremeRule {
    fn anomaly_type(&self) -> AnomalyType {
        AnomalyType::RsiExtreme
    }

    fn min_history(&self) -> usize {
        Rsi::new(self.period).warmup_periods()
    }

    fn evaluate(&self, series: &PriceSeries, ticker: &str) -> Result<Vec<Anomaly>, DetectError> {
        if !self.has_history(series) {
            return Ok(vec![]);
        }
        let Some((close, timestamp_ns)) = latest(series) else {
            return Ok(vec![]);
        };
        let Some(rsi) = Rsi::new(self.period)
            .compute(series.points())
            .last()
            .copied()
            .filter(|v| v.is_finite())
        else {
            return Ok(vec![]);
        };

        let (severity, description) = if rsi > self.overbought {
            (
                (rsi - self.overbought) / (100.0 - self.overbought),
                format!("RSI overbought at {rsi:.1} (threshold: {})", self.overbought),
            )
        } else if rsi < self.oversold {
            (
                (self.oversold - rsi) / self.oversold,
                format!("RSI oversold at {rsi:.1} (threshold: {})", self.oversold),
            )
        } else {
            return Ok(vec![]);
        };

        Ok(vec![Anomaly::new(
            ticker,
            timestamp_ns,
            AnomalyType::RsiExtreme,
            severity,
            close,
            None,
            description,
            AlertPriority::Info,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::series_from_closes;
    use approx::assert_relative_eq;

    fn rule() -> RsiExtremeRule {
        RsiExtremeRule::new(14, 70.0, 30.0)
    }

    #[test]
    fn test_short_series_is_empty() {
        let closes: Vec<f64> = (0..13).map(|i| 50.0 + f64::from(i)).collect();

        assert!(rule().evaluate(&series_from_closes(&closes), "AAPL").unwrap().is_empty());
    }

    #[test]
    fn test_rising_series_overbought() {
        let closes: Vec<f64> = (0..20).map(|i| 50.0 + f64::from(i)).collect();
        let anomalies = rule().evaluate(&series_from_closes(&closes), "AAPL").unwrap();

        assert_eq!(anomalies.len(), 1);
        let a = &anomalies[0];
        assert_eq!(a.priority(), AlertPriority::Info);
        assert_relative_eq!(a.severity(), 1.0);
        assert_eq!(a.description(), "RSI overbought at 100.0 (threshold: 70)");
    }

    #[test]
    fn test_falling_series_oversold() {
        let closes: Vec<f64> = (0..20).map(|i| 80.0 - f64::from(i)).collect();
        let anomalies = rule().evaluate(&series_from_closes(&closes), "AAPL").unwrap();

        assert_eq!(anomalies.len(), 1);
        assert_relative_eq!(anomalies[0].severity(), 1.0);
        assert_eq!(anomalies[0].description(), "RSI oversold at 0.0 (threshold: 30)");
    }

    #[test]
    fn test_partial_overbought_severity() {
        // deltas over the last 14 bars: 12 x +1, 2 x -1 -> RSI = 12 / 14 * 100
        let mut closes: Vec<f64> = vec![100.0];
        for i in 0..14 {
            let last = closes[closes.len() - 1];
            closes.push(if i == 3 || i == 9 { last - 1.0 } else { last + 1.0 });
        }
        let anomalies = rule().evaluate(&series_from_closes(&closes), "AAPL").unwrap();

        let rsi = 12.0 / 14.0 * 100.0;
        assert_relative_eq!(anomalies[0].severity(), (rsi - 70.0) / 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_series_neutral() {
        assert!(rule().evaluate(&series_from_closes(&[42.0; 30]), "AAPL").unwrap().is_empty());
    }
}
