//! Moving Average Convergence Divergence (MACD) indicator

use crate::stats::ema;
use crate::traits::MultiOutputIndicator;
use tickwatch_types::PricePoint;

/// MACD output series.
#[derive(Debug, Clone)]
pub struct MacdResult {
    /// MACD line = EMA(fast) - EMA(slow)
    pub macd: Vec<f64>,
    /// Signal line = EMA(signal) of the MACD line
    pub signal: Vec<f64>,
    /// Histogram = MACD line - signal line
    pub histogram: Vec<f64>,
}

/// MACD with EMAs seeded from the first close (no bias adjustment).
#[derive(Debug, Clone)]
pub struct Macd {
    /// Fast EMA span
    pub fast: usize,
    /// Slow EMA span
    pub slow: usize,
    /// Signal EMA span
    pub signal: usize,
}

impl Macd {
    /// Creates a new MACD indicator.
    #[must_use]
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self { fast, slow, signal }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl MultiOutputIndicator for Macd {
    type Output = MacdResult;

    fn compute_all(&self, bars: &[PricePoint]) -> Self::Output {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema(&closes, self.fast);
        let slow = ema(&closes, self.slow);

        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema(&macd, self.signal);
        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        MacdResult {
            macd,
            signal,
            histogram,
        }
    }

    fn warmup_periods(&self) -> usize {
        self.slow.max(self.fast) + self.signal
    }
}
