//! Relative Strength Index (RSI) indicator

use crate::stats::expanding_rolling_mean;
use crate::traits::Indicator;
use tickwatch_types::PricePoint;

/// RSI value reported when neither gains nor losses occurred in the window.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Relative Strength Index
///
/// Gains and losses are averaged with a trailing simple mean over `period`
/// bars (shorter at the start of the series, so every index is defined).
///
/// `RSI = 100 - 100 / (1 + avg_gain / avg_loss)`
///
/// A window without losses yields 100. A window without any movement yields
/// [`NEUTRAL_RSI`].
#[derive(Debug, Clone)]
pub struct Rsi {
    /// Number of periods for the gain/loss averages
    pub period: usize,
}

impl Rsi {
    /// Creates a new RSI indicator with the given period.
    #[must_use]
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Maps average gain and loss to an RSI value in `[0, 100]`.
    #[inline]
    fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                return NEUTRAL_RSI;
            }
            return 100.0;
        }
        let rs = avg_gain / avg_loss;
        (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    fn compute(&self, bars: &[PricePoint]) -> Vec<f64> {
        let len = bars.len();
        if self.period == 0 || len == 0 {
            return vec![f64::NAN; len];
        }

        let mut gains = vec![0.0; len];
        let mut losses = vec![0.0; len];
        for i in 1..len {
            let delta = bars[i].close - bars[i - 1].close;
            if delta > 0.0 {
                gains[i] = delta;
            } else {
                losses[i] = -delta;
            }
        }

        let avg_gain = expanding_rolling_mean(&gains, self.period);
        let avg_loss = expanding_rolling_mean(&losses, self.period);

        avg_gain
            .iter()
            .zip(avg_loss.iter())
            .map(|(&g, &l)| Self::from_averages(g, l))
            .collect()
    }

    fn warmup_periods(&self) -> usize {
        self.period
    }
}
