//! Tickwatch Indicators
//!
//! Technical indicator engine for the tickwatch anomaly detector.
//! All computations are pure and operate on whole price series.
//!
//! # Features
//! - Indicator trait with vectorized computation
//! - Multi-output indicators (MACD, Bollinger Bands)
//! - `IndicatorFrame` computing every indicator at once for summary views
//!
//! # Available Indicators
//! - RSI: Relative Strength Index (rolling-mean smoothing)
//! - MACD: line, signal and histogram
//! - Bollinger Bands: upper, middle, lower bands plus width/position
//! - ATR: Average True Range (simple rolling mean of true range)
//! - SMA: Simple Moving Average
//! - EMA: Exponential Moving Average
//!
//! Values before an indicator is warm are `f64::NAN`; numeric edge cases
//! (zero variance, zero average loss) resolve to documented sentinels
//! instead of errors.

#![deny(clippy::all)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod frame;
pub mod impl_;
pub mod stats;
pub mod traits;

// Re-export main types
pub use error::IndicatorError;
pub use frame::{IndicatorFrame, IndicatorSettings, IndicatorSnapshot};
pub use traits::{Indicator, MultiOutputIndicator};

// Re-export indicator implementations
pub use impl_::{
    atr::Atr,
    bollinger::{BollingerBands, BollingerResult},
    ema::Ema,
    macd::{Macd, MacdResult},
    rsi::Rsi,
    sma::Sma,
};
