//! Average True Range (ATR) indicator

use crate::stats::rolling_mean;
use crate::traits::Indicator;
use tickwatch_types::PricePoint;

/// Average True Range
///
/// Simple trailing mean of the true range over `period` bars. The first
/// `period - 1` values are NaN.
#[derive(Debug, Clone)]
pub struct Atr {
    /// Number of periods for ATR calculation
    pub period: usize,
}

impl Atr {
    /// Creates a new ATR indicator with the given period.
    #[must_use]
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// True range series.
    ///
    /// `TR[0] = high - low`, then
    /// `TR[i] = max(high - low, |high - prev_close|, |low - prev_close|)`.
    #[must_use]
    pub fn true_range(bars: &[PricePoint]) -> Vec<f64> {
        let mut tr = Vec::with_capacity(bars.len());
        let mut prev_close: Option<f64> = None;

        for bar in bars {
            let hl = bar.high - bar.low;
            let value = match prev_close {
                Some(pc) => hl.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
                None => hl,
            };
            tr.push(value);
            prev_close = Some(bar.close);
        }
        tr
    }
}

impl Default for Atr {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Atr {
    fn compute(&self, bars: &[PricePoint]) -> Vec<f64> {
        rolling_mean(&Self::true_range(bars), self.period)
    }

    fn warmup_periods(&self) -> usize {
        self.period
    }
}
