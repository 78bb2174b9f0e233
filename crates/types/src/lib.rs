//! Tickwatch Types
//!
//! Core data structures shared by the tickwatch crates: price bars and
//! validated series, detected anomalies, configuration and the core error.

#![deny(clippy::all)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

pub mod anomaly;
pub mod config;
pub mod error;
pub mod forecast;
pub mod price;
pub mod time;

// Re-export main types for convenience
pub use anomaly::{AlertPriority, Anomaly, AnomalyType};
pub use config::{DetectorConfig, ForecastConfig, LoggingConfig, env_override};
pub use error::CoreError;
pub use forecast::{Deviation, DeviationDirection, ForecastPoint, ForecastResult, Frequency};
pub use price::{PricePoint, PriceSeries};
