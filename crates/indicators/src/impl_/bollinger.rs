//! Bollinger Bands indicator

use crate::stats::{rolling_mean, rolling_std};
use crate::traits::MultiOutputIndicator;
use tickwatch_types::PricePoint;

/// Bollinger Bands result containing upper, middle, and lower bands.
#[derive(Debug, Clone)]
pub struct BollingerResult {
    /// Upper band = SMA + std_dev * std
    pub upper: Vec<f64>,
    /// Middle band = SMA
    pub middle: Vec<f64>,
    /// Lower band = SMA - std_dev * std
    pub lower: Vec<f64>,
}

impl BollingerResult {
    /// Relative band width `(upper - lower) / middle`.
    ///
    /// NaN where the bands are not warm or the middle band is zero.
    #[must_use]
    pub fn width(&self) -> Vec<f64> {
        self.upper
            .iter()
            .zip(&self.lower)
            .zip(&self.middle)
            .map(|((&u, &l), &m)| if m == 0.0 { f64::NAN } else { (u - l) / m.abs() })
            .collect()
    }

    /// Position of each close within the band: 0 at the lower band, 1 at the
    /// upper band. Zero-width bands report 0.5.
    #[must_use]
    pub fn position(&self, closes: &[f64]) -> Vec<f64> {
        self.upper
            .iter()
            .zip(&self.lower)
            .zip(closes)
            .map(|((&u, &l), &c)| {
                let range = u - l;
                if !range.is_finite() {
                    f64::NAN
                } else if range == 0.0 {
                    0.5
                } else {
                    (c - l) / range
                }
            })
            .collect()
    }
}

/// Bollinger Bands
///
/// Three bands around a simple moving average:
/// - Upper Band = SMA + (std_dev * StdDev)
/// - Middle Band = SMA
/// - Lower Band = SMA - (std_dev * StdDev)
///
/// Uses the sample standard deviation (n - 1).
#[derive(Debug, Clone)]
pub struct BollingerBands {
    /// Period for the SMA and standard deviation
    pub period: usize,
    /// Multiplier for standard deviation (typically 2.0)
    pub std_dev: f64,
}

impl BollingerBands {
    /// Creates new Bollinger Bands with the given parameters.
    #[must_use]
    pub fn new(period: usize, std_dev: f64) -> Self {
        Self { period, std_dev }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new(20, 2.0)
    }
}

impl MultiOutputIndicator for BollingerBands {
    type Output = BollingerResult;

    fn compute_all(&self, bars: &[PricePoint]) -> Self::Output {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let middle = rolling_mean(&closes, self.period);
        let std = rolling_std(&closes, self.period, 1);

        let upper = middle
            .iter()
            .zip(&std)
            .map(|(&m, &s)| m + self.std_dev * s)
            .collect();
        let lower = middle
            .iter()
            .zip(&std)
            .map(|(&m, &s)| m - self.std_dev * s)
            .collect();

        BollingerResult {
            upper,
            middle,
            lower,
        }
    }

    fn warmup_periods(&self) -> usize {
        self.period
    }
}
