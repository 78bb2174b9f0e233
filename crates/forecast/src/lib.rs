//! Tickwatch Forecast
//!
//! Next-period price forecasts with confidence intervals, cached per ticker.
//!
//! The model itself sits behind [`ModelTrainer`] / [`ForecastModel`]; the
//! detector only sees [`ForecastSource`]. [`ForecastAdapter`] owns the model
//! cache, retrains stale models and turns an interval breach into a
//! [`Deviation`](tickwatch_types::Deviation).
//!
//! # Concurrency
//! Each ticker has its own lock. Training for one ticker never blocks reads
//! or training for another, and concurrent requests for the same ticker
//! train at most once.

#![deny(clippy::all)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

pub mod adapter;
pub mod error;
pub mod traits;
pub mod trend_seasonal;

pub use adapter::{ForecastAdapter, ModelInfo};
pub use error::ForecastError;
pub use traits::{ForecastModel, ForecastSource, ModelTrainer, deviation_from};
pub use trend_seasonal::{TrendSeasonalModel, TrendSeasonalTrainer, z_for_confidence};
