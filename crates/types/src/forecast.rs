//! Forecast value types exchanged with the forecasting collaborator.

use crate::time::{NS_PER_DAY, NS_PER_HOUR};

/// Point forecast with a confidence interval for the next period.
///
/// `lower_bound <= predicted <= upper_bound` is guaranteed by the producing
/// model, not re-validated here.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForecastResult {
    /// Point prediction
    pub predicted: f64,
    /// Lower bound of the confidence interval
    pub lower_bound: f64,
    /// Upper bound of the confidence interval
    pub upper_bound: f64,
}

impl ForecastResult {
    /// Creates a new forecast result.
    #[must_use]
    pub fn new(predicted: f64, lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            predicted,
            lower_bound,
            upper_bound,
        }
    }

    /// Returns true when `price` lies inside `[lower_bound, upper_bound]`.
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.lower_bound && price <= self.upper_bound
    }
}

/// One future period of a forecast.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForecastPoint {
    /// Period timestamp (UTC epoch ns)
    pub timestamp_ns: i64,
    /// Point prediction
    pub predicted: f64,
    /// Lower bound of the confidence interval
    pub lower_bound: f64,
    /// Upper bound of the confidence interval
    pub upper_bound: f64,
}

impl From<ForecastPoint> for ForecastResult {
    fn from(point: ForecastPoint) -> Self {
        Self::new(point.predicted, point.lower_bound, point.upper_bound)
    }
}

/// Spacing of forecast periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// One period per day
    #[default]
    Daily,
    /// One period per hour
    Hourly,
}

impl Frequency {
    /// Period length in nanoseconds.
    #[must_use]
    pub fn step_ns(self) -> i64 {
        match self {
            Frequency::Daily => NS_PER_DAY,
            Frequency::Hourly => NS_PER_HOUR,
        }
    }
}

/// Side of the confidence interval a price escaped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationDirection {
    /// Price above the upper bound
    Above,
    /// Price below the lower bound
    Below,
}

impl DeviationDirection {
    /// Lowercase label used in descriptions.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeviationDirection::Above => "above",
            DeviationDirection::Below => "below",
        }
    }
}

/// A price outside its forecast interval.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Deviation {
    /// Instrument identifier
    pub ticker: String,
    /// Which bound was breached
    pub direction: DeviationDirection,
    /// Observed price
    pub actual: f64,
    /// Forecast point prediction
    pub predicted: f64,
    /// The breached bound
    pub bound: f64,
    /// `|actual - bound| / predicted * 100`
    pub deviation_pct: f64,
}
