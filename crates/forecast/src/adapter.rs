//! Per-ticker forecast model cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use parking_lot::Mutex;
use tickwatch_types::{
    Deviation, ForecastConfig, ForecastPoint, ForecastResult, Frequency, PriceSeries,
};

use crate::error::ForecastError;
use crate::traits::{ForecastModel, ForecastSource, ModelTrainer, deviation_from};
use crate::trend_seasonal::TrendSeasonalTrainer;

type Slot = Arc<Mutex<Option<ModelEntry>>>;

struct ModelEntry {
    model: Box<dyn ForecastModel>,
    trained_at: SystemTime,
    trained_instant: Instant,
    sample_count: usize,
}

impl ModelEntry {
    fn age(&self) -> Duration {
        self.trained_instant.elapsed()
    }

    fn is_stale(&self, max_age: Duration) -> bool {
        self.age() >= max_age
    }
}

/// Metadata about a cached model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Ticker the model was trained for
    pub ticker: String,
    /// Wall-clock training time
    pub trained_at: SystemTime,
    /// Time since training
    pub age: Duration,
    /// Number of observations used for training
    pub sample_count: usize,
}

/// Trains, caches and queries one forecast model per ticker.
///
/// Shared across threads behind an `Arc`; every method takes `&self`.
pub struct ForecastAdapter {
    trainer: Box<dyn ModelTrainer>,
    config: ForecastConfig,
    models: Mutex<HashMap<String, Slot>>,
}

impl ForecastAdapter {
    /// Creates an adapter using the built-in trend/seasonality trainer.
    #[must_use]
    pub fn new(config: ForecastConfig) -> Self {
        let trainer = TrendSeasonalTrainer::from_config(&config);
        Self::with_trainer(config, trainer)
    }

    /// Creates an adapter with a custom trainer.
    #[must_use]
    pub fn with_trainer(config: ForecastConfig, trainer: impl ModelTrainer + 'static) -> Self {
        Self {
            trainer: Box::new(trainer),
            config,
            models: Mutex::new(HashMap::new()),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Trains (or replaces) the model for `ticker`.
    ///
    /// # Errors
    /// [`ForecastError::InsufficientData`] below the minimum training size,
    /// or the trainer's error.
    pub fn train(&self, ticker: &str, series: &PriceSeries) -> Result<(), ForecastError> {
        let slot = self.slot(ticker);
        let mut entry = slot.lock();
        *entry = Some(self.fit(ticker, series)?);
        Ok(())
    }

    /// Forecasts `periods` future periods from the cached model.
    ///
    /// # Errors
    /// [`ForecastError::NoModel`] when `ticker` was never trained, or the
    /// model's prediction error.
    pub fn forecast(
        &self,
        ticker: &str,
        periods: usize,
        freq: Frequency,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let slot = self
            .existing_slot(ticker)
            .ok_or_else(|| ForecastError::NoModel(ticker.to_string()))?;
        let entry = slot.lock();
        match entry.as_ref() {
            Some(entry) => entry.model.predict(periods, freq),
            None => Err(ForecastError::NoModel(ticker.to_string())),
        }
    }

    /// Forecast for the next daily period.
    ///
    /// Trains when no model is cached and retrains when the cached one is
    /// older than the configured maximum age. Returns `Ok(None)` when
    /// `series` is shorter than the minimum training size.
    ///
    /// # Errors
    /// Training or prediction failures. A failed retrain does not fall back
    /// to the stale model.
    pub fn get_current_forecast(
        &self,
        ticker: &str,
        series: &PriceSeries,
    ) -> Result<Option<ForecastResult>, ForecastError> {
        if series.len() < self.config.min_training_points {
            tracing::debug!(
                ticker,
                points = series.len(),
                required = self.config.min_training_points,
                "not enough history for a forecast"
            );
            return Ok(None);
        }

        let max_age = self.config.max_model_age();
        let slot = self.slot(ticker);
        let mut guard = slot.lock();

        let needs_training = match guard.as_ref() {
            None => true,
            Some(entry) if entry.is_stale(max_age) => {
                tracing::info!(
                    ticker,
                    age_secs = entry.age().as_secs(),
                    "forecast model is stale, retraining"
                );
                true
            }
            Some(_) => false,
        };
        if needs_training {
            *guard = None;
            *guard = Some(self.fit(ticker, series)?);
        }

        let Some(entry) = guard.as_ref() else {
            return Err(ForecastError::NoModel(ticker.to_string()));
        };
        let points = entry.model.predict(1, Frequency::Daily)?;
        Ok(points.into_iter().next().map(ForecastResult::from))
    }

    /// Checks `actual` against `forecast`'s interval.
    #[must_use]
    pub fn check_deviation(
        &self,
        ticker: &str,
        actual: f64,
        forecast: &ForecastResult,
    ) -> Option<Deviation> {
        deviation_from(ticker, actual, forecast)
    }

    /// Trains when no model exists or the cached one is at least `max_age`
    /// old. Returns whether training happened.
    ///
    /// # Errors
    /// Training failures.
    pub fn retrain_if_stale(
        &self,
        ticker: &str,
        series: &PriceSeries,
        max_age: Duration,
    ) -> Result<bool, ForecastError> {
        let slot = self.slot(ticker);
        let mut guard = slot.lock();

        if guard.as_ref().is_some_and(|entry| !entry.is_stale(max_age)) {
            return Ok(false);
        }
        *guard = Some(self.fit(ticker, series)?);
        Ok(true)
    }

    /// Metadata for the cached model of `ticker`.
    #[must_use]
    pub fn model_info(&self, ticker: &str) -> Option<ModelInfo> {
        let slot = self.existing_slot(ticker)?;
        let entry = slot.lock();
        entry.as_ref().map(|entry| ModelInfo {
            ticker: ticker.to_string(),
            trained_at: entry.trained_at,
            age: entry.age(),
            sample_count: entry.sample_count,
        })
    }

    /// Drops the cached model for `ticker`. Returns whether one existed.
    ///
    /// Waits for an in-flight training of `ticker`. The slot itself stays
    /// registered, so requests racing the eviction still share one training.
    pub fn evict(&self, ticker: &str) -> bool {
        self.existing_slot(ticker)
            .is_some_and(|slot| slot.lock().take().is_some())
    }

    /// Tickers with a trained model, sorted.
    #[must_use]
    pub fn tickers(&self) -> Vec<String> {
        let slots: Vec<(String, Slot)> = self
            .models
            .lock()
            .iter()
            .map(|(ticker, slot)| (ticker.clone(), Arc::clone(slot)))
            .collect();

        let mut tickers: Vec<String> = slots
            .into_iter()
            .filter(|(_, slot)| slot.lock().is_some())
            .map(|(ticker, _)| ticker)
            .collect();
        tickers.sort();
        tickers
    }

    fn slot(&self, ticker: &str) -> Slot {
        let mut models = self.models.lock();
        Arc::clone(models.entry(ticker.to_string()).or_default())
    }

    fn existing_slot(&self, ticker: &str) -> Option<Slot> {
        self.models.lock().get(ticker).map(Arc::clone)
    }

    fn fit(&self, ticker: &str, series: &PriceSeries) -> Result<ModelEntry, ForecastError> {
        let required = self.config.min_training_points;
        if series.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: series.len(),
            });
        }

        let model = self.trainer.fit(series).inspect_err(|err| {
            tracing::warn!(ticker, error = %err, "forecast model training failed");
        })?;
        tracing::info!(ticker, samples = series.len(), "trained forecast model");

        Ok(ModelEntry {
            model,
            trained_at: SystemTime::now(),
            trained_instant: Instant::now(),
            sample_count: series.len(),
        })
    }
}

impl std::fmt::Debug for ForecastAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastAdapter")
            .field("config", &self.config)
            .field("tickers", &self.tickers())
            .finish_non_exhaustive()
    }
}

impl ForecastSource for ForecastAdapter {
    fn current_forecast(
        &self,
        ticker: &str,
        series: &PriceSeries,
    ) -> Result<Option<ForecastResult>, ForecastError> {
        self.get_current_forecast(ticker, series)
    }
}
