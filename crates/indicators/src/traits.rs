//! Indicator traits.

use tickwatch_types::PricePoint;

/// Single-output indicator over a bar series.
///
/// `compute` returns one value per bar. Values before the indicator is warm
/// are NaN.
pub trait Indicator: Send + Sync {
    /// Computes the indicator for all bars.
    fn compute(&self, bars: &[PricePoint]) -> Vec<f64>;

    /// Bars needed before the output is meaningful.
    fn warmup_periods(&self) -> usize;
}

/// Indicator producing several aligned series from one pass, like Bollinger
/// Bands or MACD.
pub trait MultiOutputIndicator: Send + Sync {
    /// Result struct holding the output series.
    type Output;

    /// Computes all outputs at once.
    fn compute_all(&self, bars: &[PricePoint]) -> Self::Output;

    /// Bars needed before the outputs are meaningful.
    fn warmup_periods(&self) -> usize;
}
