//! Tickwatch Detector
//!
//! Runs a fixed ensemble of detection rules over the latest bar of a price
//! series and merges their findings into a ranked anomaly list and a single
//! risk score.
//!
//! # Rules
//! - Z-score of the latest close against the rolling baseline
//! - Volatility spike: ATR above a historical percentile
//! - Bollinger Band breakout
//! - RSI overbought / oversold
//! - Forecast deviation: close outside the forecast interval
//!
//! Rules are independent. A failing rule is logged and skipped; the others
//! still report.

#![deny(clippy::all)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod ensemble;
pub mod error;
pub mod logging;
pub mod rules;

pub use config::AppConfig;
pub use ensemble::{AnomalyDetector, DetectionReport, EnsembleWeights};
pub use error::DetectError;
pub use logging::init_logging;
pub use rules::{
    BollingerBreakoutRule, DetectionRule, ForecastDeviationRule, RsiExtremeRule,
    VolatilitySpikeRule, ZScoreRule,
};
