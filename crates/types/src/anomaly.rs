//! Detected anomalies and their classification.

use std::fmt::Write as _;

use crate::time::format_utc;

/// Detection method that produced an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    /// Close far from its rolling mean
    Zscore,
    /// ATR above its historical percentile
    VolatilitySpike,
    /// Close outside the forecast confidence interval
    ProphetDeviation,
    /// Close outside the Bollinger Bands
    BollingerBreakout,
    /// RSI overbought or oversold
    RsiExtreme,
}

impl AnomalyType {
    /// All variants in detection order.
    pub const ALL: [AnomalyType; 5] = [
        AnomalyType::Zscore,
        AnomalyType::VolatilitySpike,
        AnomalyType::BollingerBreakout,
        AnomalyType::RsiExtreme,
        AnomalyType::ProphetDeviation,
    ];

    /// Wire name (`zscore`, `volatility_spike`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyType::Zscore => "zscore",
            AnomalyType::VolatilitySpike => "volatility_spike",
            AnomalyType::ProphetDeviation => "prophet_deviation",
            AnomalyType::BollingerBreakout => "bollinger_breakout",
            AnomalyType::RsiExtreme => "rsi_extreme",
        }
    }

    /// Human readable title (`Volatility Spike`).
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            AnomalyType::Zscore => "Zscore",
            AnomalyType::VolatilitySpike => "Volatility Spike",
            AnomalyType::ProphetDeviation => "Prophet Deviation",
            AnomalyType::BollingerBreakout => "Bollinger Breakout",
            AnomalyType::RsiExtreme => "Rsi Extreme",
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert priority, ordered `Info < Warning < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    /// Informational
    Info,
    /// Worth a look
    Warning,
    /// Needs attention now
    Critical,
}

impl AlertPriority {
    /// Numeric rank (0 = info, 2 = critical).
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            AlertPriority::Info => 0,
            AlertPriority::Warning => 1,
            AlertPriority::Critical => 2,
        }
    }

    /// Marker used at the top of alert messages.
    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            AlertPriority::Info => "🟢",
            AlertPriority::Warning => "🟡",
            AlertPriority::Critical => "🔴",
        }
    }
}

/// A single detection, produced by one rule for the latest bar of a series.
///
/// Immutable once built; `severity` is clamped to `[0, 1]` on construction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "AnomalyRecord")]
pub struct Anomaly {
    ticker: String,
    timestamp_ns: i64,
    anomaly_type: AnomalyType,
    severity: f64,
    current_price: f64,
    expected_price: Option<f64>,
    description: String,
    priority: AlertPriority,
}

/// Wire form of [`Anomaly`]; deserialized values go through `Anomaly::new`.
#[derive(serde::Deserialize)]
struct AnomalyRecord {
    ticker: String,
    timestamp_ns: i64,
    anomaly_type: AnomalyType,
    severity: f64,
    current_price: f64,
    expected_price: Option<f64>,
    description: String,
    priority: AlertPriority,
}

impl From<AnomalyRecord> for Anomaly {
    fn from(r: AnomalyRecord) -> Self {
        Self::new(
            r.ticker,
            r.timestamp_ns,
            r.anomaly_type,
            r.severity,
            r.current_price,
            r.expected_price,
            r.description,
            r.priority,
        )
    }
}

impl Anomaly {
    /// Creates an anomaly. NaN severity becomes 0.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticker: impl Into<String>,
        timestamp_ns: i64,
        anomaly_type: AnomalyType,
        severity: f64,
        current_price: f64,
        expected_price: Option<f64>,
        description: impl Into<String>,
        priority: AlertPriority,
    ) -> Self {
        let severity = if severity.is_nan() {
            0.0
        } else {
            severity.clamp(0.0, 1.0)
        };
        Self {
            ticker: ticker.into(),
            timestamp_ns,
            anomaly_type,
            severity,
            current_price,
            expected_price,
            description: description.into(),
            priority,
        }
    }

    /// Instrument identifier.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Timestamp of the bar that triggered the detection.
    #[must_use]
    pub fn timestamp_ns(&self) -> i64 {
        self.timestamp_ns
    }

    /// Detection method.
    #[must_use]
    pub fn anomaly_type(&self) -> AnomalyType {
        self.anomaly_type
    }

    /// Normalized magnitude in `[0, 1]`.
    #[must_use]
    pub fn severity(&self) -> f64 {
        self.severity
    }

    /// Close of the triggering bar.
    #[must_use]
    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    /// Reference price the rule compared against, if any.
    #[must_use]
    pub fn expected_price(&self) -> Option<f64> {
        self.expected_price
    }

    /// Human readable rationale.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Alert priority.
    #[must_use]
    pub fn priority(&self) -> AlertPriority {
        self.priority
    }

    /// Formats the anomaly as a multi-line alert message.
    #[must_use]
    pub fn to_alert_message(&self) -> String {
        let mut msg = format!(
            "{} **{} ANOMALY DETECTED**\n━━━━━━━━━━━━━━━━━━━━━\n📊 Type: {}\n💰 Price: ${:.2}\n",
            self.priority.emoji(),
            self.ticker,
            self.anomaly_type.title(),
            self.current_price
        );
        if let Some(expected) = self.expected_price {
            let _ = writeln!(msg, "📈 Expected: ${expected:.2}");
        }
        let _ = write!(
            msg,
            "⚠️ Severity: {:.1}%\n📝 {}\n🕐 {}",
            self.severity * 100.0,
            self.description,
            format_utc(self.timestamp_ns)
        );
        msg
    }
}
