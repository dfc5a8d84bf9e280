//! Effective account status and display tones.

use crate::classify::{classify, GROUP_USAGE};
use crate::overrides::ProviderDisplay;
use crate::paint::{Color, Style};
use crate::snapshot::{Snapshot, Status};

/// Remaining percent at or below which an account is near its limit
pub const NEAR_LIMIT_PERCENT: f64 = 20.0;
/// Remaining percent above which a gauge reads as healthy
pub const GOOD_PERCENT: f64 = 50.0;

/// Severity of a displayed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Warn,
    Bad,
    Muted,
}

impl Tone {
    pub fn color(&self) -> Color {
        match self {
            Tone::Good => Color::Green,
            Tone::Warn => Color::Yellow,
            Tone::Bad => Color::Red,
            Tone::Muted => Color::DarkGray,
        }
    }

    pub fn style(&self) -> Style {
        Style::fg(self.color())
    }
}

/// Lowest remaining percent among the snapshot's usage metrics
pub fn lowest_remaining(snapshot: &Snapshot, display: &ProviderDisplay) -> Option<(String, f64)> {
    snapshot
        .metrics
        .iter()
        .filter(|(_, m)| m.is_meaningful())
        .filter(|(key, m)| classify(key, m, display).group == GROUP_USAGE)
        .filter_map(|(key, m)| m.percent().map(|p| (key.clone(), p)))
        .fold(None, |low: Option<(String, f64)>, (key, p)| match low {
            Some((_, lp)) if lp <= p => low,
            _ => Some((key, p)),
        })
}

/// Provider status escalated by what the usage metrics show.
///
/// Only `Ok` and `NearLimit` are escalated; error-like statuses are reported
/// as given.
pub fn effective_status(snapshot: &Snapshot, display: &ProviderDisplay) -> Status {
    let status = snapshot.status;
    if !matches!(status, Status::Ok | Status::NearLimit) {
        return status;
    }
    match lowest_remaining(snapshot, display) {
        Some((_, p)) if p <= 0.0 => Status::Limited,
        Some((_, p)) if p <= NEAR_LIMIT_PERCENT => Status::NearLimit,
        _ => status,
    }
}

/// Tone of a gauge showing `remaining` percent
pub fn gauge_tone(remaining: Option<f64>) -> Tone {
    match remaining {
        Some(p) if p > GOOD_PERCENT => Tone::Good,
        Some(p) if p > NEAR_LIMIT_PERCENT => Tone::Warn,
        Some(_) => Tone::Bad,
        None => Tone::Muted,
    }
}

pub fn status_tone(status: Status) -> Tone {
    match status {
        Status::Ok => Tone::Good,
        Status::NearLimit => Tone::Warn,
        Status::Limited | Status::Auth | Status::Error => Tone::Bad,
        Status::Unknown | Status::Unsupported => Tone::Muted,
    }
}

/// Tone of a budget at `percent` of its limit (over 100 means overspent)
pub fn budget_tone(percent: f64) -> Tone {
    gauge_tone(Some(100.0 - percent))
}
