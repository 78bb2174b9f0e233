//! Simple Moving Average (SMA) indicator

use crate::stats::rolling_mean;
use crate::traits::Indicator;
use tickwatch_types::PricePoint;

/// Trailing mean of the last `period` closes; NaN until the window fills.
#[derive(Debug, Clone)]
pub struct Sma {
    /// Number of periods for the moving average
    pub period: usize,
}

impl Sma {
    /// Creates a new SMA indicator with the given period.
    #[must_use]
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Sma {
    fn compute(&self, bars: &[PricePoint]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rolling_mean(&closes, self.period)
    }

    fn warmup_periods(&self) -> usize {
        self.period
    }
}
