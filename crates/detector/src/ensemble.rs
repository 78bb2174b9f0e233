//! Ensemble aggregation: runs every rule, ranks the results and folds them
//! into one score.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tickwatch_forecast::ForecastSource;
use tickwatch_indicators::{IndicatorFrame, IndicatorSettings, IndicatorSnapshot};
use tickwatch_types::{Anomaly, AnomalyType, CoreError, DetectorConfig, PriceSeries};

use crate::rules::{
    BollingerBreakoutRule, DetectionRule, ForecastDeviationRule, RsiExtremeRule,
    VolatilitySpikeRule, ZScoreRule,
};

/// Per-type weights for the ensemble score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights {
    /// Weight per anomaly type
    #[serde(default = "default_weights")]
    pub weights: HashMap<AnomalyType, f64>,
    /// Weight for a type missing from `weights`
    #[serde(default = "default_fallback")]
    pub fallback: f64,
}

fn default_weights() -> HashMap<AnomalyType, f64> {
    HashMap::from([
        (AnomalyType::Zscore, 0.30),
        (AnomalyType::ProphetDeviation, 0.25),
        (AnomalyType::VolatilitySpike, 0.20),
        (AnomalyType::BollingerBreakout, 0.15),
        (AnomalyType::RsiExtreme, 0.10),
    ])
}

fn default_fallback() -> f64 {
    0.10
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            fallback: default_fallback(),
        }
    }
}

impl EnsembleWeights {
    /// Weight for `anomaly_type`.
    #[must_use]
    pub fn weight(&self, anomaly_type: AnomalyType) -> f64 {
        self.weights
            .get(&anomaly_type)
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Weighted mean of severities, clamped to `[0, 1]`.
    ///
    /// 0.0 when `anomalies` is empty or the weights sum to zero.
    #[must_use]
    pub fn score(&self, anomalies: &[Anomaly]) -> f64 {
        let (weighted, total) = anomalies.iter().fold((0.0, 0.0), |(weighted, total), a| {
            let w = self.weight(a.anomaly_type());
            (weighted + w * a.severity(), total + w)
        });

        if total <= 0.0 {
            return 0.0;
        }
        let score = weighted / total;
        if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Checks that every weight is finite and non-negative.
    ///
    /// # Errors
    /// [`CoreError::Config`] naming the offending weight.
    pub fn validate(&self) -> Result<(), CoreError> {
        let named = self
            .weights
            .iter()
            .map(|(t, w)| (t.as_str(), *w))
            .chain(std::iter::once(("fallback", self.fallback)));
        for (name, weight) in named {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(CoreError::config(format!(
                    "ensemble weight {name} must be non-negative, got {weight}"
                )));
            }
        }
        Ok(())
    }
}

/// Anomalies and ensemble score from one detection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Instrument identifier
    pub ticker: String,
    /// Anomalies, most severe first
    pub anomalies: Vec<Anomaly>,
    /// Weighted severity in `[0, 1]`
    pub ensemble_score: f64,
}

/// Runs the detection rules and aggregates their findings.
///
/// Stateless apart from the forecaster's model cache; `&self` methods may be
/// called concurrently.
pub struct AnomalyDetector {
    rules: Vec<Box<dyn DetectionRule>>,
    weights: EnsembleWeights,
    indicator_settings: IndicatorSettings,
}

impl AnomalyDetector {
    /// Creates a detector with the standard rules in order: z-score,
    /// volatility, Bollinger, RSI, forecast deviation.
    #[must_use]
    pub fn new(config: &DetectorConfig, forecast_source: Arc<dyn ForecastSource>) -> Self {
        let rules: Vec<Box<dyn DetectionRule>> = vec![
            Box::new(ZScoreRule::from_config(config)),
            Box::new(VolatilitySpikeRule::from_config(config)),
            Box::new(BollingerBreakoutRule::from_config(config)),
            Box::new(RsiExtremeRule::from_config(config)),
            Box::new(ForecastDeviationRule::from_config(forecast_source, config)),
        ];
        let indicator_settings = IndicatorSettings {
            rsi_period: config.rsi_period,
            bb_period: config.bollinger_period,
            bb_std_dev: config.bollinger_std_dev,
            atr_period: config.atr_period,
            ..IndicatorSettings::default()
        };

        Self {
            rules,
            weights: EnsembleWeights::default(),
            indicator_settings,
        }
    }

    /// Creates a detector with a custom rule set.
    #[must_use]
    pub fn with_rules(rules: Vec<Box<dyn DetectionRule>>, weights: EnsembleWeights) -> Self {
        Self {
            rules,
            weights,
            indicator_settings: IndicatorSettings::default(),
        }
    }

    /// Replaces the ensemble weights.
    #[must_use]
    pub fn with_weights(mut self, weights: EnsembleWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Ensemble weights in use.
    #[must_use]
    pub fn weights(&self) -> &EnsembleWeights {
        &self.weights
    }

    /// Anomaly types of the configured rules, in evaluation order.
    #[must_use]
    pub fn rule_types(&self) -> Vec<AnomalyType> {
        self.rules.iter().map(|r| r.anomaly_type()).collect()
    }

    /// Runs every rule on the latest bar of `series`.
    ///
    /// Rules that fail or panic are logged and contribute nothing. Results are sorted by
    /// severity, most severe first; ties keep rule order.
    #[must_use]
    pub fn detect_all(&self, series: &PriceSeries, ticker: &str) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        for rule in &self.rules {
            match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(series, ticker))) {
                Ok(Ok(found)) => anomalies.extend(found),
                Ok(Err(err)) => {
                    tracing::error!(
                        ticker,
                        rule = %rule.anomaly_type(),
                        error = %err,
                        "detection rule failed"
                    );
                }
                Err(payload) => {
                    tracing::error!(
                        ticker,
                        rule = %rule.anomaly_type(),
                        error = panic_message(payload.as_ref()),
                        "detection rule panicked"
                    );
                }
            }
        }

        anomalies.sort_by(|a, b| b.severity().total_cmp(&a.severity()));

        if !anomalies.is_empty() {
            tracing::info!(
                ticker,
                count = anomalies.len(),
                "Detected {} anomalies for {}",
                anomalies.len(),
                ticker
            );
        }
        anomalies
    }

    /// Ensemble score of a fresh detection pass.
    #[must_use]
    pub fn ensemble_score(&self, series: &PriceSeries, ticker: &str) -> f64 {
        self.score_anomalies(&self.detect_all(series, ticker))
    }

    /// Ensemble score of already detected anomalies.
    #[must_use]
    pub fn score_anomalies(&self, anomalies: &[Anomaly]) -> f64 {
        self.weights.score(anomalies)
    }

    /// Anomalies and score from a single detection pass.
    #[must_use]
    pub fn report(&self, series: &PriceSeries, ticker: &str) -> DetectionReport {
        let anomalies = self.detect_all(series, ticker);
        let ensemble_score = self.score_anomalies(&anomalies);
        DetectionReport {
            ticker: ticker.to_string(),
            anomalies,
            ensemble_score,
        }
    }

    /// Latest indicator values for `series`.
    #[must_use]
    pub fn indicator_summary(&self, series: &PriceSeries, ticker: &str) -> IndicatorSnapshot {
        let frame = IndicatorFrame::with_settings(series, &self.indicator_settings)
            .unwrap_or_else(|err| {
                tracing::warn!(ticker, error = %err, "invalid indicator settings, using defaults");
                IndicatorFrame::calculate_all(series)
            });
        frame.latest_snapshot(ticker)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl std::fmt::Debug for AnomalyDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyDetector")
            .field("rules", &self.rule_types())
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}
