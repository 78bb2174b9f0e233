//! Price bars and validated price series.

use crate::error::CoreError;

/// One OHLCV bar.
/// `timestamp_ns` is the bar's open time in UTC epoch nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PricePoint {
    /// Unix epoch nanoseconds UTC (open time)
    pub timestamp_ns: i64,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

impl PricePoint {
    /// Typical price (HLC/3).
    #[must_use]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Chronologically ordered OHLCV series for a single instrument.
///
/// Timestamps are strictly increasing and all values are finite; both are
/// checked by the constructors, so every rolling computation downstream can
/// rely on them.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from bars.
    ///
    /// # Errors
    /// Returns [`CoreError::ContractViolation`] when `points` is empty, holds a
    /// non-finite value or a negative volume, or is not strictly increasing by
    /// timestamp.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, CoreError> {
        validate_points(&points)?;
        Ok(Self { points })
    }

    /// Builds a series from parallel columns.
    ///
    /// # Errors
    /// Returns [`CoreError::ContractViolation`] when a column is missing rows
    /// (length mismatch) or the assembled bars fail [`PriceSeries::new`].
    pub fn from_columns(
        timestamps_ns: &[i64],
        open: &[f64],
        high: &[f64],
        low: &[f64],
        close: &[f64],
        volume: &[f64],
    ) -> Result<Self, CoreError> {
        let len = timestamps_ns.len();
        for (name, column_len) in [
            ("open", open.len()),
            ("high", high.len()),
            ("low", low.len()),
            ("close", close.len()),
            ("volume", volume.len()),
        ] {
            if column_len != len {
                return Err(CoreError::contract(format!(
                    "Column {name} has {column_len} rows, expected {len}"
                )));
            }
        }

        let points = (0..len)
            .map(|i| PricePoint {
                timestamp_ns: timestamps_ns[i],
                open: open[i],
                high: high[i],
                low: low[i],
                close: close[i],
                volume: volume[i],
            })
            .collect();
        Self::new(points)
    }

    /// Returns the number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false` for a constructed series; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the bars as a slice.
    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Returns the close prices.
    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Returns the most recent bar.
    #[must_use]
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Returns the most recent close.
    #[must_use]
    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// Returns the timestamp of the most recent bar.
    #[must_use]
    pub fn last_timestamp_ns(&self) -> Option<i64> {
        self.points.last().map(|p| p.timestamp_ns)
    }

    /// Returns the first `len` bars as a new series.
    ///
    /// `len` is clamped to `1..=self.len()` so the result is never empty.
    #[must_use]
    pub fn head(&self, len: usize) -> Self {
        let len = len.clamp(1, self.points.len());
        Self {
            points: self.points[..len].to_vec(),
        }
    }

    /// Returns the last `len` bars as a new series.
    ///
    /// `len` is clamped to `1..=self.len()` so the result is never empty.
    #[must_use]
    pub fn tail(&self, len: usize) -> Self {
        let len = len.clamp(1, self.points.len());
        Self {
            points: self.points[self.points.len() - len..].to_vec(),
        }
    }

    /// Consumes the series and returns its bars.
    #[must_use]
    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = CoreError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl<'de> serde::Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<PricePoint>::deserialize(deserializer)?;
        Self::new(points).map_err(serde::de::Error::custom)
    }
}

fn validate_points(points: &[PricePoint]) -> Result<(), CoreError> {
    if points.is_empty() {
        return Err(CoreError::contract("Empty price series"));
    }

    for (i, point) in points.iter().enumerate() {
        if !point.open.is_finite()
            || !point.high.is_finite()
            || !point.low.is_finite()
            || !point.close.is_finite()
            || !point.volume.is_finite()
        {
            return Err(CoreError::contract(format!(
                "NaN/Inf at index {i}: {point:?}"
            )));
        }

        if point.volume < 0.0 {
            return Err(CoreError::contract(format!(
                "Negative volume at index {i}: {}",
                point.volume
            )));
        }

        if i > 0 && point.timestamp_ns <= points[i - 1].timestamp_ns {
            return Err(CoreError::contract(format!(
                "Non-monotonic timestamp at index {i}: {} <= {}",
                point.timestamp_ns,
                points[i - 1].timestamp_ns
            )));
        }
    }

    Ok(())
}
