//! Exponential Moving Average (EMA) indicator

use crate::stats;
use crate::traits::Indicator;
use tickwatch_types::PricePoint;

/// Exponential Moving Average of close prices
///
/// Multiplier = 2 / (period + 1), no bias adjustment. The first close seeds
/// the average, so the output is defined from index 0.
#[derive(Debug, Clone)]
pub struct Ema {
    /// Span of the EMA in periods
    pub period: usize,
}

impl Ema {
    /// Creates a new EMA indicator with the given period.
    #[must_use]
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Ema {
    fn compute(&self, bars: &[PricePoint]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        stats::ema(&closes, self.period)
    }

    fn warmup_periods(&self) -> usize {
        1
    }
}
