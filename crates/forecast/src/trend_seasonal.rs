//! Built-in trend plus weekly-seasonality forecaster.
//!
//! Fits `close = intercept + slope * days + weekday_effect` by least squares
//! and sizes the interval from the residual standard deviation.

use serde::{Deserialize, Serialize};
use tickwatch_indicators::stats::{count_f64, mean_std};
use tickwatch_types::time::{NS_PER_DAY, weekday_index};
use tickwatch_types::{ForecastConfig, ForecastPoint, Frequency, PriceSeries};

use crate::error::ForecastError;
use crate::traits::{ForecastModel, ModelTrainer};

/// Two-sided normal quantile for a confidence level.
///
/// Levels between table entries round down to the nearest entry.
#[must_use]
pub fn z_for_confidence(confidence_level: f64) -> f64 {
    match confidence_level {
        x if x >= 0.99 => 2.576,
        x if x >= 0.95 => 1.96,
        x if x >= 0.90 => 1.645,
        x if x >= 0.80 => 1.282,
        _ => 0.674,
    }
}

/// Fits [`TrendSeasonalModel`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeasonalTrainer {
    /// Interval coverage, e.g. 0.95
    pub confidence_level: f64,
    /// Whether to fit a day-of-week profile
    pub weekly_seasonality: bool,
}

impl TrendSeasonalTrainer {
    /// Creates a trainer.
    #[must_use]
    pub fn new(confidence_level: f64, weekly_seasonality: bool) -> Self {
        Self {
            confidence_level,
            weekly_seasonality,
        }
    }

    /// Creates a trainer from forecast configuration.
    #[must_use]
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new(config.confidence_level, config.weekly_seasonality)
    }

    /// Fits the concrete model type.
    ///
    /// # Errors
    /// [`ForecastError::Training`] with fewer than two points or when the fit
    /// is not finite.
    pub fn fit_model(&self, series: &PriceSeries) -> Result<TrendSeasonalModel, ForecastError> {
        let bars = series.points();
        if bars.len() < 2 {
            return Err(ForecastError::training(format!(
                "need at least 2 points to fit a trend, got {}",
                bars.len()
            )));
        }

        let origin_ns = bars[0].timestamp_ns;
        let xs: Vec<f64> = bars.iter().map(|b| days_between(origin_ns, b.timestamp_ns)).collect();
        let ys = series.closes();

        let (x_mean, _) = mean_std(&xs, 0);
        let (y_mean, _) = mean_std(&ys, 0);
        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (x, y) in xs.iter().zip(&ys) {
            sxx += (x - x_mean).powi(2);
            sxy += (x - x_mean) * (y - y_mean);
        }
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = y_mean - slope * x_mean;

        let mut residuals: Vec<f64> = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| y - (intercept + slope * x))
            .collect();

        let mut seasonal = [0.0; 7];
        if self.weekly_seasonality {
            let mut sums = [0.0; 7];
            let mut counts = [0usize; 7];
            for (bar, r) in bars.iter().zip(&residuals) {
                let day = weekday_index(bar.timestamp_ns);
                sums[day] += r;
                counts[day] += 1;
            }
            for ((effect, sum), count) in seasonal.iter_mut().zip(sums).zip(counts) {
                if count > 0 {
                    *effect = sum / count_f64(count);
                }
            }
            for (bar, r) in bars.iter().zip(residuals.iter_mut()) {
                *r -= seasonal[weekday_index(bar.timestamp_ns)];
            }
        }

        let (_, sigma) = mean_std(&residuals, 1);
        let model = TrendSeasonalModel {
            origin_ns,
            last_timestamp_ns: bars[bars.len() - 1].timestamp_ns,
            intercept,
            slope,
            seasonal,
            sigma,
            z: z_for_confidence(self.confidence_level),
        };

        if !(model.intercept.is_finite() && model.slope.is_finite() && model.sigma.is_finite()) {
            return Err(ForecastError::training("non-finite trend fit"));
        }
        Ok(model)
    }
}

impl Default for TrendSeasonalTrainer {
    fn default() -> Self {
        Self::new(0.95, true)
    }
}

impl ModelTrainer for TrendSeasonalTrainer {
    fn fit(&self, series: &PriceSeries) -> Result<Box<dyn ForecastModel>, ForecastError> {
        Ok(Box::new(self.fit_model(series)?))
    }
}

/// Linear trend with an additive weekday profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeasonalModel {
    /// First training timestamp; trend x-axis is days since this point
    pub origin_ns: i64,
    /// Last training timestamp
    pub last_timestamp_ns: i64,
    /// Trend value at `origin_ns`
    pub intercept: f64,
    /// Trend change per day
    pub slope: f64,
    /// Additive effect per weekday, Monday first
    pub seasonal: [f64; 7],
    /// Residual standard deviation
    pub sigma: f64,
    /// Interval half-width in units of `sigma`
    pub z: f64,
}

impl TrendSeasonalModel {
    /// Point prediction at a timestamp.
    #[must_use]
    pub fn value_at(&self, timestamp_ns: i64) -> f64 {
        self.intercept
            + self.slope * days_between(self.origin_ns, timestamp_ns)
            + self.seasonal[weekday_index(timestamp_ns)]
    }
}

impl ForecastModel for TrendSeasonalModel {
    fn predict(
        &self,
        periods: usize,
        freq: Frequency,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let mut points = Vec::with_capacity(periods);
        let mut timestamp_ns = self.last_timestamp_ns;

        for step in 1..=periods {
            timestamp_ns = timestamp_ns
                .checked_add(freq.step_ns())
                .ok_or_else(|| ForecastError::prediction("forecast horizon overflows timestamp"))?;
            let predicted = self.value_at(timestamp_ns);
            // interval widens with the horizon
            let half_width = self.z * self.sigma * count_f64(step).sqrt();

            if !predicted.is_finite() || !half_width.is_finite() {
                return Err(ForecastError::prediction(format!(
                    "non-finite forecast at step {step}"
                )));
            }
            points.push(ForecastPoint {
                timestamp_ns,
                predicted,
                lower_bound: predicted - half_width,
                upper_bound: predicted + half_width,
            });
        }

        Ok(points)
    }
}

#[allow(clippy::cast_precision_loss)]
fn days_between(from_ns: i64, to_ns: i64) -> f64 {
    (to_ns - from_ns) as f64 / NS_PER_DAY as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tickwatch_types::PricePoint;

    const BASE_TS: i64 = 1_704_067_200_000_000_000; // Monday 2024-01-01

    fn daily_series(closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .zip(0_i64..)
            .map(|(&close, i)| PricePoint {
                timestamp_ns: BASE_TS + i * NS_PER_DAY,
                open: close,
                high: close,
                low: close,
                close,
                volume: 100.0,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn test_z_table() {
        assert_relative_eq!(z_for_confidence(0.99), 2.576);
        assert_relative_eq!(z_for_confidence(0.95), 1.96);
        assert_relative_eq!(z_for_confidence(0.97), 1.96);
        assert_relative_eq!(z_for_confidence(0.90), 1.645);
        assert_relative_eq!(z_for_confidence(0.80), 1.282);
        assert_relative_eq!(z_for_confidence(0.50), 0.674);
    }

    #[test]
    fn test_exact_linear_trend() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + 2.0 * f64::from(i)).collect();
        let model = TrendSeasonalTrainer::new(0.95, false)
            .fit_model(&daily_series(&closes))
            .unwrap();

        assert_relative_eq!(model.slope, 2.0, epsilon = 1e-9);
        assert_relative_eq!(model.intercept, 100.0, epsilon = 1e-9);
        assert!(model.sigma.abs() < 1e-9);

        let next = model.predict(1, Frequency::Daily).unwrap();
        assert_eq!(next[0].timestamp_ns, BASE_TS + 30 * NS_PER_DAY);
        assert_relative_eq!(next[0].predicted, 160.0, epsilon = 1e-9);
    }

    #[test]
    fn test_weekly_profile_recovered() {
        // flat level with a +7 bump every Friday
        let closes: Vec<f64> = (0..70).map(|i| if i % 7 == 4 { 107.0 } else { 100.0 }).collect();
        let model = TrendSeasonalTrainer::new(0.95, true)
            .fit_model(&daily_series(&closes))
            .unwrap();

        assert!(model.seasonal[4] > model.seasonal[0] + 6.0);
        // day 74 after a Monday start is a Friday
        let friday = BASE_TS + 74 * NS_PER_DAY;
        assert!(model.value_at(friday) > model.value_at(friday - NS_PER_DAY) + 6.0);
    }

    #[test]
    fn test_intervals_ordered_and_widening() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (f64::from(i) * 0.7).sin() * 3.0).collect();
        let model = TrendSeasonalTrainer::default()
            .fit_model(&daily_series(&closes))
            .unwrap();
        let points = model.predict(3, Frequency::Daily).unwrap();

        assert_eq!(points.len(), 3);
        for p in &points {
            assert!(p.lower_bound <= p.predicted && p.predicted <= p.upper_bound);
        }
        let width = |p: &ForecastPoint| p.upper_bound - p.lower_bound;
        assert!(width(&points[2]) > width(&points[0]));
    }

    #[test]
    fn test_hourly_step() {
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        let model = TrendSeasonalTrainer::default()
            .fit_model(&daily_series(&closes))
            .unwrap();
        let points = model.predict(2, Frequency::Hourly).unwrap();

        assert_eq!(points[1].timestamp_ns - points[0].timestamp_ns, 3_600_000_000_000);
    }

    #[test]
    fn test_single_point_fails() {
        let err = TrendSeasonalTrainer::default()
            .fit_model(&daily_series(&[100.0]))
            .unwrap_err();

        assert!(matches!(err, ForecastError::Training(_)));
    }
}
