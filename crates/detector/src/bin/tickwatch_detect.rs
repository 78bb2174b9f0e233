//! CLI: JSON price series in, JSON detection report out.
//!
//! Usage:
//!   tickwatch-detect [--config FILE] [INPUT]
//!
//! INPUT (or stdin when absent or `-`) holds
//! `{"ticker": "AAPL", "bars": [{"timestamp_ns": ..., "open": ..., ...}]}`.
//! Without `--config` the configuration comes from environment variables.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tickwatch_detector::{AnomalyDetector, AppConfig, DetectError, DetectionReport, init_logging};
use tickwatch_forecast::ForecastAdapter;
use tickwatch_indicators::IndicatorSnapshot;
use tickwatch_types::PriceSeries;

#[derive(Debug, Deserialize)]
struct DetectRequest {
    ticker: String,
    bars: PriceSeries,
}

#[derive(Debug, Serialize)]
struct DetectResponse {
    #[serde(flatten)]
    report: DetectionReport,
    indicators: IndicatorSnapshot,
}

#[derive(Debug, Parser)]
#[command(name = "tickwatch-detect")]
#[command(about = "Detect anomalies in an OHLCV price series", long_about = None)]
struct Cli {
    /// JSON configuration file (environment variables when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request file; stdin when absent or `-`
    input: Option<PathBuf>,
}

impl Cli {
    fn input_path(&self) -> Option<&Path> {
        self.input.as_deref().filter(|p| *p != Path::new("-"))
    }
}

fn read_request(input: Option<&Path>) -> Result<DetectRequest, DetectError> {
    let reader: Box<dyn Read> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    Ok(serde_json::from_reader(reader)?)
}

fn run(cli: &Cli) -> Result<(), DetectError> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::from_env()?,
    };
    init_logging(&config.logging);

    let request = read_request(cli.input_path())?;
    tracing::info!(ticker = %request.ticker, bars = request.bars.len(), "analyzing series");

    let forecaster = Arc::new(ForecastAdapter::new(config.forecast.clone()));
    let detector =
        AnomalyDetector::new(&config.detector, forecaster).with_weights(config.weights.clone());

    let response = DetectResponse {
        report: detector.report(&request.bars, &request.ticker),
        indicators: detector.indicator_summary(&request.bars, &request.ticker),
    };

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &response)?;
    writeln!(stdout)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "detection failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;
    use clap::error::ErrorKind;

    fn parse(list: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("tickwatch-detect").chain(list.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let cli = parse(&["--config", "app.json", "bars.json"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("app.json")));
        assert_eq!(cli.input_path(), Some(Path::new("bars.json")));

        let short = parse(&["-c", "app.json"]).unwrap();
        assert_eq!(short.config.as_deref(), Some(Path::new("app.json")));
        assert!(short.input_path().is_none());

        assert!(parse(&["-"]).unwrap().input_path().is_none());
    }

    #[test]
    fn test_parse_args_rejects_bad_usage() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert!(parse(&["--config"]).is_err());
        assert_eq!(
            parse(&["--verbose"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert!(parse(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn test_request_rejects_unsorted_bars() {
        let json = r#"{"ticker": "AAPL", "bars": [
            {"timestamp_ns": 2, "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0, "volume": 1.0},
            {"timestamp_ns": 1, "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0, "volume": 1.0}
        ]}"#;

        assert!(serde_json::from_str::<DetectRequest>(json).is_err());
    }
}
