//! Snapshot and metric data types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Units that mark a metric as a monetary amount
const CURRENCY_UNITS: &[&str] = &["USD", "EUR", "GBP", "JPY", "CNY", "$"];

/// A single measured quantity reported by a provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<f64>,
    /// Unit of measure ("%", "USD", "tokens", "requests", ...)
    #[serde(default)]
    pub unit: String,
    /// Accounting window ("5h", "7d", "month", ...)
    #[serde(default)]
    pub window: String,
}

impl Metric {
    /// Metric with only a `used` value
    pub fn from_used(used: f64) -> Self {
        Self {
            used: Some(used),
            ..Self::default()
        }
    }

    /// Metric with only a `remaining` value
    pub fn from_remaining(remaining: f64) -> Self {
        Self {
            remaining: Some(remaining),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_remaining(mut self, remaining: f64) -> Self {
        self.remaining = Some(remaining);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_window(mut self, window: impl Into<String>) -> Self {
        self.window = window.into();
        self
    }

    /// Whether the metric carries a usable measurement
    pub fn is_meaningful(&self) -> bool {
        self.used.is_some() || self.remaining.is_some()
    }

    /// Whether the unit denotes money
    pub fn is_currency(&self) -> bool {
        CURRENCY_UNITS
            .iter()
            .any(|u| self.unit.eq_ignore_ascii_case(u))
    }

    pub fn is_percent_unit(&self) -> bool {
        self.unit == "%"
    }

    /// Remaining share of the limit, in percent.
    ///
    /// Returns `None` ("unavailable") when no limit can be derived.
    pub fn percent(&self) -> Option<f64> {
        if let Some(limit) = self.limit.filter(|l| *l > 0.0) {
            if let Some(remaining) = self.remaining {
                return Some(remaining / limit * 100.0);
            }
            if let Some(used) = self.used {
                return Some((limit - used) / limit * 100.0);
            }
        }
        if self.is_percent_unit() {
            if let Some(used) = self.used {
                return Some(100.0 - used);
            }
            return self.remaining;
        }
        None
    }

    /// Consumed share of the limit, in percent
    pub fn used_percent(&self) -> Option<f64> {
        self.percent().map(|p| 100.0 - p)
    }

    /// Best single number for display: `used`, falling back to `remaining`
    pub fn value(&self) -> Option<f64> {
        self.used.or(self.remaining)
    }

    /// True when every populated measurement is zero
    pub fn is_zero(&self) -> bool {
        self.value().is_none_or(|v| v == 0.0)
    }
}

/// Provider-reported account status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    NearLimit,
    Limited,
    Auth,
    Error,
    #[default]
    Unknown,
    Unsupported,
}

impl Status {
    /// Short badge text
    pub fn label(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::NearLimit => "NEAR LIMIT",
            Status::Limited => "LIMITED",
            Status::Auth => "AUTH",
            Status::Error => "ERROR",
            Status::Unknown => "UNKNOWN",
            Status::Unsupported => "UNSUPPORTED",
        }
    }

    /// Single-character indicator used in compact rows
    pub fn indicator(&self) -> char {
        match self {
            Status::Ok => '●',
            Status::NearLimit => '◐',
            Status::Limited => '○',
            Status::Auth | Status::Error => '✗',
            Status::Unknown | Status::Unsupported => '?',
        }
    }

    /// Whether the account produced usable data
    pub fn is_healthy(&self) -> bool {
        matches!(self, Status::Ok | Status::NearLimit | Status::Limited)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One daily bucket of a time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl TimePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// One observation of one account at one provider.
///
/// Immutable once handed to the core; a refresh replaces the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub provider_id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    /// Free-text message from the provider (errors, notices)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub metrics: BTreeMap<String, Metric>,
    /// String-valued telemetry that did not fit the metric shape
    #[serde(default)]
    pub raw: BTreeMap<String, String>,
    /// Account metadata (plan, email, organization)
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub diagnostics: BTreeMap<String, String>,
    /// Reset times keyed by metric key
    #[serde(default)]
    pub resets: BTreeMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub daily_series: BTreeMap<String, Vec<TimePoint>>,
}

/// Current snapshots keyed by account id
pub type SnapshotSet = BTreeMap<String, Snapshot>;

impl Snapshot {
    pub fn new(provider_id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            account_id: account_id.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, metric: Metric) -> Self {
        self.metrics.insert(key.into(), metric);
        self
    }

    pub fn with_raw(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.raw.insert(key.into(), value.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_reset(mut self, key: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.resets.insert(key.into(), at);
        self
    }

    pub fn with_series(mut self, key: impl Into<String>, points: Vec<TimePoint>) -> Self {
        self.daily_series.insert(key.into(), points);
        self
    }

    /// `used` value of a metric, if present
    pub fn metric_used(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).and_then(|m| m.used)
    }

    /// Human-facing account name (`account_name` attribute or the account id)
    pub fn display_name(&self) -> &str {
        self.attributes
            .get("account_name")
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.account_id)
    }

    /// Case-insensitive substring match on account or provider id
    pub fn matches_filter(&self, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        let needle = filter.to_lowercase();
        self.account_id.to_lowercase().contains(&needle)
            || self.provider_id.to_lowercase().contains(&needle)
    }
}
