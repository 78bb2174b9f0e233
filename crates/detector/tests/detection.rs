//! End-to-end detection scenarios.

use std::sync::Arc;
use std::thread;

use approx::assert_relative_eq;
use proptest::prelude::*;
use tickwatch_detector::{
    AnomalyDetector, DetectionRule, EnsembleWeights, ForecastDeviationRule, ZScoreRule,
};
use tickwatch_forecast::{ForecastAdapter, ForecastError, ForecastSource};
use tickwatch_types::{
    AlertPriority, AnomalyType, DetectorConfig, ForecastConfig, ForecastResult, PricePoint,
    PriceSeries,
};

const BASE_TS: i64 = 1_704_067_200_000_000_000; // 2024-01-01 00:00:00 UTC
const DAY_NS: i64 = 86_400_000_000_000;

struct FixedSource(Option<ForecastResult>);

impl ForecastSource for FixedSource {
    fn current_forecast(
        &self,
        _ticker: &str,
        _series: &PriceSeries,
    ) -> Result<Option<ForecastResult>, ForecastError> {
        Ok(self.0)
    }
}

struct FailingSource;

impl ForecastSource for FailingSource {
    fn current_forecast(
        &self,
        _ticker: &str,
        _series: &PriceSeries,
    ) -> Result<Option<ForecastResult>, ForecastError> {
        Err(ForecastError::prediction("upstream unavailable"))
    }
}

struct PanickingSource;

impl ForecastSource for PanickingSource {
    fn current_forecast(
        &self,
        _ticker: &str,
        _series: &PriceSeries,
    ) -> Result<Option<ForecastResult>, ForecastError> {
        panic!("forecast backend crashed")
    }
}

fn make_bar(i: usize, close: f64) -> PricePoint {
    PricePoint {
        timestamp_ns: BASE_TS + i64::try_from(i).unwrap() * DAY_NS,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1_000.0,
    }
}

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(closes.iter().enumerate().map(|(i, &c)| make_bar(i, c)).collect()).unwrap()
}

fn detector(source: impl ForecastSource + 'static) -> AnomalyDetector {
    AnomalyDetector::new(&DetectorConfig::default(), Arc::new(source))
}

#[test]
fn standard_rule_order() {
    let types = detector(FixedSource(None)).rule_types();

    assert_eq!(types, AnomalyType::ALL.to_vec());
}

#[test]
fn short_series_yields_nothing() {
    let det = detector(FixedSource(Some(ForecastResult::new(1.0, 0.5, 1.5))));
    let closes: Vec<f64> = (0..10).map(|i| 100.0 * f64::from(i + 1)).collect();

    assert!(det.detect_all(&series(&closes), "AAPL").is_empty());
    assert_relative_eq!(det.ensemble_score(&series(&closes), "AAPL"), 0.0);
}

#[test]
fn flat_series_scores_zero() {
    let det = detector(FixedSource(None));
    let flat = series(&[100.0; 60]);

    assert!(det.detect_all(&flat, "AAPL").is_empty());
    assert_relative_eq!(det.ensemble_score(&flat, "AAPL"), 0.0);
}

#[test]
fn spike_after_flat_run_is_critical_zscore() {
    let det = detector(FixedSource(None));
    let mut closes = vec![100.0; 24];
    closes.push(200.0);

    let anomalies = det.detect_all(&series(&closes), "AAPL");
    let zscore: Vec<_> = anomalies
        .iter()
        .filter(|a| a.anomaly_type() == AnomalyType::Zscore)
        .collect();

    assert_eq!(zscore.len(), 1);
    let a = zscore[0];
    assert_relative_eq!(a.current_price(), 200.0);
    assert_relative_eq!(a.expected_price().unwrap(), 100.0, epsilon = 1e-9);
    assert_relative_eq!(a.severity(), 1.0);
    assert_eq!(a.priority(), AlertPriority::Critical);
    assert_eq!(a.ticker(), "AAPL");
    assert_eq!(a.timestamp_ns(), BASE_TS + 24 * DAY_NS);
}

#[test]
fn results_sorted_by_severity() {
    let det = detector(FixedSource(None));
    let mut closes = vec![100.0; 24];
    closes.push(200.0);

    let anomalies = det.detect_all(&series(&closes), "AAPL");
    assert!(anomalies.len() >= 2);
    for pair in anomalies.windows(2) {
        assert!(pair[0].severity() >= pair[1].severity());
    }
    // z-score and RSI both saturate at 1.0; rule order breaks the tie
    assert_eq!(anomalies[0].anomaly_type(), AnomalyType::Zscore);
}

#[test]
fn score_equals_severity_when_only_zscore_fires() {
    let rules: Vec<Box<dyn DetectionRule>> = vec![Box::new(ZScoreRule::new(3.0, 20, 0.7))];
    let det = AnomalyDetector::with_rules(rules, EnsembleWeights::default());
    let mut closes: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 99.0 } else { 101.0 }).collect();
    closes.push(104.0);
    let data = series(&closes);

    let anomalies = det.detect_all(&data, "AAPL");
    assert_eq!(anomalies.len(), 1);
    assert_relative_eq!(
        det.ensemble_score(&data, "AAPL"),
        anomalies[0].severity(),
        epsilon = 1e-12
    );
}

#[test]
fn detection_is_idempotent() {
    let det = detector(FixedSource(Some(ForecastResult::new(100.0, 98.0, 102.0))));
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + f64::from(i % 5) * 2.0).collect();
    let data = series(&closes);

    assert_eq!(det.detect_all(&data, "AAPL"), det.detect_all(&data, "AAPL"));
    assert_eq!(det.report(&data, "AAPL"), det.report(&data, "AAPL"));
}

#[test]
fn rsi_extreme_fires_during_rally() {
    let det = detector(FixedSource(None));
    let mut closes: Vec<f64> = (0..20).map(|i| 50.0 + f64::from(i) * 20.0 / 19.0).collect();
    closes.extend((1..=20).map(|i| 70.0 - f64::from(i)));
    let data = series(&closes);

    let fired = (14..=20).any(|n| {
        det.detect_all(&data.head(n), "AAPL")
            .iter()
            .any(|a| {
                a.anomaly_type() == AnomalyType::RsiExtreme && a.priority() == AlertPriority::Info
            })
    });
    assert!(fired);
}

#[test]
fn forecast_deviation_reported_with_expected_price() {
    let det = detector(FixedSource(Some(ForecastResult::new(100.0, 98.0, 102.0))));
    let mut closes = vec![100.0; 30];
    closes.push(103.0);

    let anomalies = det.detect_all(&series(&closes), "AAPL");
    let forecast = anomalies
        .iter()
        .find(|a| a.anomaly_type() == AnomalyType::ProphetDeviation)
        .unwrap();

    assert_relative_eq!(forecast.severity(), 0.1, epsilon = 1e-9);
    assert_eq!(forecast.priority(), AlertPriority::Warning);
    assert_relative_eq!(forecast.expected_price().unwrap(), 100.0);
    assert_eq!(forecast.description(), "Price 1.0% above forecast");
}

#[test]
fn failing_collaborator_does_not_suppress_other_rules() {
    let det = detector(FailingSource);
    let mut closes = vec![100.0; 34];
    closes.push(200.0);

    let anomalies = det.detect_all(&series(&closes), "AAPL");
    assert!(anomalies.iter().any(|a| a.anomaly_type() == AnomalyType::Zscore));
    assert!(anomalies.iter().all(|a| a.anomaly_type() != AnomalyType::ProphetDeviation));
}

#[test]
fn panicking_collaborator_does_not_suppress_other_rules() {
    let det = detector(PanickingSource);
    let mut closes = vec![100.0; 34];
    closes.push(200.0);
    let data = series(&closes);

    let anomalies = det.detect_all(&data, "AAPL");
    let types: Vec<AnomalyType> = anomalies.iter().map(|a| a.anomaly_type()).collect();
    assert!(types.contains(&AnomalyType::Zscore));
    assert!(types.contains(&AnomalyType::BollingerBreakout));
    assert!(!types.contains(&AnomalyType::ProphetDeviation));

    let report = det.report(&data, "AAPL");
    assert!(report.ensemble_score > 0.0);
}

#[test]
fn report_combines_anomalies_and_score() {
    let det = detector(FixedSource(None));
    let mut closes = vec![100.0; 24];
    closes.push(200.0);
    let data = series(&closes);

    let report = det.report(&data, "AAPL");
    assert_eq!(report.ticker, "AAPL");
    assert_eq!(report.anomalies, det.detect_all(&data, "AAPL"));
    assert_relative_eq!(report.ensemble_score, det.score_anomalies(&report.anomalies));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["anomalies"][0]["anomaly_type"], "zscore");
}

#[test]
fn custom_forecast_rule_via_with_rules() {
    let source: Arc<dyn ForecastSource> =
        Arc::new(FixedSource(Some(ForecastResult::new(100.0, 99.0, 101.0))));
    let rules: Vec<Box<dyn DetectionRule>> =
        vec![Box::new(ForecastDeviationRule::new(source, 5, 10.0, 0.5))];
    let det = AnomalyDetector::with_rules(rules, EnsembleWeights::default());

    let anomalies = det.detect_all(&series(&[100.0, 100.0, 100.0, 100.0, 120.0]), "AAPL");
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].priority(), AlertPriority::Critical);
}

#[test]
fn concurrent_detection_across_tickers() {
    let adapter = Arc::new(ForecastAdapter::new(ForecastConfig::default()));
    let det = AnomalyDetector::new(&DetectorConfig::default(), adapter.clone());
    let closes: Vec<f64> = (0..45).map(|i| 100.0 + (f64::from(i) * 0.5).sin() * 2.0).collect();
    let data = series(&closes);

    let reports: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = ["AAPL", "MSFT", "GOOG"]
            .into_iter()
            .map(|ticker| {
                let det = &det;
                let data = &data;
                s.spawn(move || det.report(data, ticker))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(reports.len(), 3);
    for report in &reports {
        assert!((0.0..=1.0).contains(&report.ensemble_score));
    }
    assert_eq!(adapter.tickers(), vec!["AAPL", "GOOG", "MSFT"]);
}

#[test]
fn indicator_summary_for_latest_bar() {
    let det = detector(FixedSource(None));
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + f64::from(i)).collect();
    let snap = det.indicator_summary(&series(&closes), "AAPL");

    assert_eq!(snap.ticker, "AAPL");
    assert_eq!(snap.close, Some(129.0));
    assert_relative_eq!(snap.rsi.unwrap(), 100.0);
    assert!(snap.bb_upper.is_some());
}

fn closes_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..500.0, 1..80)
}

proptest! {
    #[test]
    fn severities_and_score_stay_in_range(closes in closes_strategy()) {
        let det = detector(FixedSource(Some(ForecastResult::new(250.0, 200.0, 300.0))));
        let data = series(&closes);

        let report = det.report(&data, "PROP");
        for a in &report.anomalies {
            prop_assert!((0.0..=1.0).contains(&a.severity()));
        }
        prop_assert!(report.ensemble_score.is_finite());
        prop_assert!((0.0..=1.0).contains(&report.ensemble_score));
    }
}
