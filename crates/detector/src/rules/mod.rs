//! Detection rules.
//!
//! Each rule looks at the latest bar of a series and reports zero or more
//! anomalies. Rules never see each other's output.

mod bollinger;
mod forecast_deviation;
mod rsi;
mod volatility;
mod zscore;

pub use bollinger::BollingerBreakoutRule;
pub use forecast_deviation::ForecastDeviationRule;
pub use rsi::RsiExtremeRule;
pub use volatility::VolatilitySpikeRule;
pub use zscore::ZScoreRule;

use tickwatch_types::{Anomaly, AnomalyType, PriceSeries};

use crate::error::DetectError;

/// One detection method of the ensemble.
pub trait DetectionRule: Send + Sync {
    /// Type tag carried by every anomaly this rule emits.
    fn anomaly_type(&self) -> AnomalyType;

    /// Minimum number of bars before the rule evaluates anything.
    fn min_history(&self) -> usize;

    /// Evaluates the rule on the latest bar of `series`.
    ///
    /// Returns an empty list below [`min_history`](Self::min_history) or
    /// when nothing is anomalous.
    ///
    /// # Errors
    /// Only for collaborator failures; numeric edge cases never error.
    fn evaluate(&self, series: &PriceSeries, ticker: &str) -> Result<Vec<Anomaly>, DetectError>;

    /// Whether `series` is long enough for this rule.
    fn has_history(&self, series: &PriceSeries) -> bool {
        series.len() >= self.min_history()
    }
}

/// Latest close and its timestamp.
fn latest(series: &PriceSeries) -> Option<(f64, i64)> {
    series.last().map(|bar| (bar.close, bar.timestamp_ns))
}
