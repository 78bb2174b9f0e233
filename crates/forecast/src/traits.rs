//! Seams between the forecast cache, the model and the detector.

use tickwatch_types::{
    Deviation, DeviationDirection, ForecastPoint, ForecastResult, Frequency, PriceSeries,
};

use crate::error::ForecastError;

/// A fitted model that can project future periods.
pub trait ForecastModel: Send + Sync {
    /// Predicts `periods` future periods spaced by `freq`, starting one step
    /// after the last training observation.
    ///
    /// # Errors
    /// Returns [`ForecastError::Prediction`] when the model cannot produce
    /// finite values.
    fn predict(&self, periods: usize, freq: Frequency) -> Result<Vec<ForecastPoint>, ForecastError>;
}

/// Fits a [`ForecastModel`] to a price series.
pub trait ModelTrainer: Send + Sync {
    /// Fits a model to the close prices of `series`.
    ///
    /// # Errors
    /// Returns [`ForecastError::Training`] on degenerate input.
    fn fit(&self, series: &PriceSeries) -> Result<Box<dyn ForecastModel>, ForecastError>;
}

/// What the detector consumes: a forecast for the next period plus a
/// breach check against it.
pub trait ForecastSource: Send + Sync {
    /// Forecast for the period after `series`, training or retraining as
    /// needed. `Ok(None)` when there is not enough history.
    ///
    /// # Errors
    /// Propagates training and prediction failures.
    fn current_forecast(
        &self,
        ticker: &str,
        series: &PriceSeries,
    ) -> Result<Option<ForecastResult>, ForecastError>;

    /// Compares `actual` against the interval of `forecast`.
    fn check_deviation(
        &self,
        ticker: &str,
        actual: f64,
        forecast: &ForecastResult,
    ) -> Option<Deviation> {
        deviation_from(ticker, actual, forecast)
    }
}

/// Returns the breach of `forecast`'s interval by `actual`, if any.
///
/// `deviation_pct = |actual - bound| / |predicted| * 100`; callers reject a
/// zero prediction beforehand.
#[must_use]
pub fn deviation_from(ticker: &str, actual: f64, forecast: &ForecastResult) -> Option<Deviation> {
    let (direction, bound) = if actual > forecast.upper_bound {
        (DeviationDirection::Above, forecast.upper_bound)
    } else if actual < forecast.lower_bound {
        (DeviationDirection::Below, forecast.lower_bound)
    } else {
        return None;
    };

    Some(Deviation {
        ticker: ticker.to_string(),
        direction,
        actual,
        predicted: forecast.predicted,
        bound,
        deviation_pct: (actual - bound).abs() / forecast.predicted.abs() * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inside_interval_is_none() {
        let forecast = ForecastResult::new(100.0, 95.0, 105.0);
        assert!(deviation_from("AAPL", 100.0, &forecast).is_none());
        assert!(deviation_from("AAPL", 105.0, &forecast).is_none());
        assert!(deviation_from("AAPL", 95.0, &forecast).is_none());
    }

    #[test]
    fn test_above_upper_bound() {
        let forecast = ForecastResult::new(100.0, 95.0, 105.0);
        let dev = deviation_from("AAPL", 110.0, &forecast).unwrap();

        assert_eq!(dev.direction, DeviationDirection::Above);
        assert_relative_eq!(dev.bound, 105.0);
        assert_relative_eq!(dev.deviation_pct, 5.0);
        assert_eq!(dev.ticker, "AAPL");
    }

    #[test]
    fn test_below_lower_bound() {
        let forecast = ForecastResult::new(200.0, 190.0, 210.0);
        let dev = deviation_from("MSFT", 180.0, &forecast).unwrap();

        assert_eq!(dev.direction, DeviationDirection::Below);
        assert_relative_eq!(dev.bound, 190.0);
        assert_relative_eq!(dev.deviation_pct, 5.0);
        assert_relative_eq!(dev.predicted, 200.0);
    }
}
