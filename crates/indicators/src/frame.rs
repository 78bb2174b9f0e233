//! Full indicator frame for one price series.
//!
//! Detection rules compute only what they need; the frame is the summary
//! view with every indicator column aligned to the input bars.

use serde::{Deserialize, Serialize};
use tickwatch_types::PriceSeries;

use crate::error::IndicatorError;
use crate::impl_::{atr::Atr, bollinger::BollingerBands, ema::Ema, macd::Macd, rsi::Rsi, sma::Sma};
use crate::traits::{Indicator, MultiOutputIndicator};

/// Periods and widths used by [`IndicatorFrame::with_settings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    /// RSI period
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    /// MACD fast EMA span
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    /// MACD slow EMA span
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    /// MACD signal EMA span
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
    /// Bollinger period
    #[serde(default = "default_bb_period")]
    pub bb_period: usize,
    /// Bollinger width in standard deviations
    #[serde(default = "default_bb_std_dev")]
    pub bb_std_dev: f64,
    /// ATR period
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    /// SMA period
    #[serde(default = "default_sma_period")]
    pub sma_period: usize,
    /// Short EMA span
    #[serde(default = "default_ema_short")]
    pub ema_short: usize,
    /// Long EMA span
    #[serde(default = "default_ema_long")]
    pub ema_long: usize,
}

fn default_rsi_period() -> usize {
    14
}
fn default_macd_fast() -> usize {
    12
}
fn default_macd_slow() -> usize {
    26
}
fn default_macd_signal() -> usize {
    9
}
fn default_bb_period() -> usize {
    20
}
fn default_bb_std_dev() -> f64 {
    2.0
}
fn default_atr_period() -> usize {
    14
}
fn default_sma_period() -> usize {
    20
}
fn default_ema_short() -> usize {
    12
}
fn default_ema_long() -> usize {
    26
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            bb_period: default_bb_period(),
            bb_std_dev: default_bb_std_dev(),
            atr_period: default_atr_period(),
            sma_period: default_sma_period(),
            ema_short: default_ema_short(),
            ema_long: default_ema_long(),
        }
    }
}

impl IndicatorSettings {
    /// Checks that every period is positive, MACD spans are ordered and the
    /// Bollinger width is finite and non-negative.
    ///
    /// # Errors
    /// Returns the first offending parameter.
    pub fn validate(&self) -> Result<(), IndicatorError> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bb_period", self.bb_period),
            ("atr_period", self.atr_period),
            ("sma_period", self.sma_period),
            ("ema_short", self.ema_short),
            ("ema_long", self.ema_long),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(IndicatorError::invalid_params(format!(
                "{name} must be positive"
            )));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(IndicatorError::invalid_params(format!(
                "macd_fast ({}) must be below macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !self.bb_std_dev.is_finite() || self.bb_std_dev < 0.0 {
            return Err(IndicatorError::param_out_of_range(
                "bb_std_dev",
                self.bb_std_dev,
                0.0,
                f64::MAX,
            ));
        }
        Ok(())
    }

    /// Bars needed before every column of the frame is warm.
    #[must_use]
    pub fn warmup_bars(&self) -> usize {
        [
            Rsi::new(self.rsi_period).warmup_periods(),
            Macd::new(self.macd_fast, self.macd_slow, self.macd_signal).warmup_periods(),
            BollingerBands::new(self.bb_period, self.bb_std_dev).warmup_periods(),
            Atr::new(self.atr_period).warmup_periods(),
            Sma::new(self.sma_period).warmup_periods(),
            Ema::new(self.ema_short).warmup_periods(),
            Ema::new(self.ema_long).warmup_periods(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Every indicator column for a series, aligned index-for-index with its bars.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    /// Bar timestamps (UTC epoch ns)
    pub timestamps_ns: Vec<i64>,
    /// Close prices
    pub close: Vec<f64>,
    /// RSI
    pub rsi: Vec<f64>,
    /// MACD line
    pub macd: Vec<f64>,
    /// MACD signal line
    pub macd_signal: Vec<f64>,
    /// MACD histogram
    pub macd_histogram: Vec<f64>,
    /// Upper Bollinger band
    pub bb_upper: Vec<f64>,
    /// Middle Bollinger band
    pub bb_middle: Vec<f64>,
    /// Lower Bollinger band
    pub bb_lower: Vec<f64>,
    /// Relative Bollinger width
    pub bb_width: Vec<f64>,
    /// Close position within the bands
    pub bb_position: Vec<f64>,
    /// Average True Range
    pub atr: Vec<f64>,
    /// Simple moving average
    pub sma_20: Vec<f64>,
    /// Short EMA
    pub ema_12: Vec<f64>,
    /// Long EMA
    pub ema_26: Vec<f64>,
    /// Bars needed before every column is warm
    pub warmup_bars: usize,
}

impl IndicatorFrame {
    /// Computes the frame with default settings.
    #[must_use]
    pub fn calculate_all(series: &PriceSeries) -> Self {
        Self::compute(series, &IndicatorSettings::default())
    }

    /// Computes the frame with custom settings.
    ///
    /// # Errors
    /// Returns an error when `settings` fail validation.
    pub fn with_settings(
        series: &PriceSeries,
        settings: &IndicatorSettings,
    ) -> Result<Self, IndicatorError> {
        settings.validate()?;
        Ok(Self::compute(series, settings))
    }

    fn compute(series: &PriceSeries, settings: &IndicatorSettings) -> Self {
        let bars = series.points();
        let close = series.closes();

        let macd = Macd::new(settings.macd_fast, settings.macd_slow, settings.macd_signal)
            .compute_all(bars);
        let bands = BollingerBands::new(settings.bb_period, settings.bb_std_dev).compute_all(bars);
        let bb_width = bands.width();
        let bb_position = bands.position(&close);

        let warmup_bars = settings.warmup_bars();
        tracing::debug!(
            bars = bars.len(),
            warmup_bars,
            rsi_period = settings.rsi_period,
            bb_period = settings.bb_period,
            "computed indicator frame"
        );

        Self {
            timestamps_ns: bars.iter().map(|b| b.timestamp_ns).collect(),
            rsi: Rsi::new(settings.rsi_period).compute(bars),
            macd: macd.macd,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            bb_upper: bands.upper,
            bb_middle: bands.middle,
            bb_lower: bands.lower,
            bb_width,
            bb_position,
            atr: Atr::new(settings.atr_period).compute(bars),
            sma_20: Sma::new(settings.sma_period).compute(bars),
            ema_12: Ema::new(settings.ema_short).compute(bars),
            ema_26: Ema::new(settings.ema_long).compute(bars),
            warmup_bars,
            close,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.close.len()
    }

    /// Returns true when the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Returns true once the frame covers the longest indicator warmup.
    #[must_use]
    pub fn is_warm(&self) -> bool {
        self.len() >= self.warmup_bars
    }

    /// Latest value of every column, NaN mapped to `None`.
    #[must_use]
    pub fn latest_snapshot(&self, ticker: &str) -> IndicatorSnapshot {
        let last = |col: &[f64]| col.last().copied().filter(|v| v.is_finite());

        IndicatorSnapshot {
            ticker: ticker.to_string(),
            timestamp_ns: self.timestamps_ns.last().copied(),
            close: last(&self.close),
            rsi: last(&self.rsi),
            macd: last(&self.macd),
            macd_signal: last(&self.macd_signal),
            macd_histogram: last(&self.macd_histogram),
            bb_upper: last(&self.bb_upper),
            bb_middle: last(&self.bb_middle),
            bb_lower: last(&self.bb_lower),
            bb_width: last(&self.bb_width),
            bb_position: last(&self.bb_position),
            atr: last(&self.atr),
            sma_20: last(&self.sma_20),
            ema_12: last(&self.ema_12),
            ema_26: last(&self.ema_26),
        }
    }
}

/// Technical indicators for a ticker at its latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct IndicatorSnapshot {
    pub ticker: String,
    pub timestamp_ns: Option<i64>,
    pub close: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_width: Option<f64>,
    pub bb_position: Option<f64>,
    pub atr: Option<f64>,
    pub sma_20: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
}
