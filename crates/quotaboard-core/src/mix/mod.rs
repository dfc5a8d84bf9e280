//! Per-entity composition (model, vendor, source, client, tool).

mod collect;
pub mod palette;
mod vendor;

use crate::paint::Color;
use crate::snapshot::TimePoint;

pub use collect::collect_mix;
pub use vendor::vendor_of;

/// Axis a snapshot's activity is broken down by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MixDimension {
    Model,
    Vendor,
    Source,
    Client,
    Tool,
}

impl MixDimension {
    pub const ALL: [MixDimension; 5] = [
        MixDimension::Model,
        MixDimension::Vendor,
        MixDimension::Source,
        MixDimension::Client,
        MixDimension::Tool,
    ];

    /// Key fragment naming the dimension ("model", "vendor", ...)
    pub fn key(&self) -> &'static str {
        match self {
            MixDimension::Model => "model",
            MixDimension::Vendor => "vendor",
            MixDimension::Source => "source",
            MixDimension::Client => "client",
            MixDimension::Tool => "tool",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MixDimension::Model => "Models",
            MixDimension::Vendor => "Vendors",
            MixDimension::Source => "Sources",
            MixDimension::Client => "Clients",
            MixDimension::Tool => "Tools",
        }
    }
}

/// Measure a composition bar is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixMode {
    Tokens,
    Cost,
    Requests,
    Sessions,
}

impl MixMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            MixMode::Tokens => "tokens",
            MixMode::Cost => "cost",
            MixMode::Requests => "requests",
            MixMode::Sessions => "sessions",
        }
    }
}

/// Activity of one entity within one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct MixEntry {
    pub name: String,
    pub requests: f64,
    pub sessions: f64,
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub cost: f64,
    /// Daily series for the entity, oldest first
    pub series: Vec<TimePoint>,
    pub color: Color,
}

impl MixEntry {
    pub fn total_tokens(&self) -> f64 {
        self.input_tokens + self.output_tokens
    }

    pub fn measure(&self, mode: MixMode) -> f64 {
        match mode {
            MixMode::Tokens => self.total_tokens(),
            MixMode::Cost => self.cost,
            MixMode::Requests => self.requests,
            MixMode::Sessions => self.sessions,
        }
    }

    /// True when every measure is zero
    pub fn is_zero(&self) -> bool {
        self.requests == 0.0
            && self.sessions == 0.0
            && self.total_tokens() == 0.0
            && self.cost == 0.0
    }
}

fn first_present(entries: &[MixEntry], preference: &[MixMode]) -> Option<MixMode> {
    preference
        .iter()
        .copied()
        .find(|mode| entries.iter().any(|e| e.measure(*mode) > 0.0))
}

/// Measure for composition bars: tokens, then requests, then sessions
pub fn select_mix_mode(entries: &[MixEntry]) -> Option<MixMode> {
    first_present(
        entries,
        &[MixMode::Tokens, MixMode::Requests, MixMode::Sessions],
    )
}

/// Broadest measure present: tokens, then cost, then requests, then sessions.
/// Orders entries when no composition measure exists, so cost-only entries
/// still rank by spend.
pub fn select_burn_mode(entries: &[MixEntry]) -> Option<MixMode> {
    first_present(
        entries,
        &[
            MixMode::Tokens,
            MixMode::Cost,
            MixMode::Requests,
            MixMode::Sessions,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(requests: f64, tokens: f64, cost: f64, sessions: f64) -> MixEntry {
        MixEntry {
            name: "x".to_string(),
            requests,
            sessions,
            input_tokens: tokens,
            output_tokens: 0.0,
            cost,
            series: Vec::new(),
            color: Color::Gray,
        }
    }

    #[test]
    fn test_select_mix_mode_preference() {
        assert_eq!(
            select_mix_mode(&[entry(5.0, 10.0, 1.0, 1.0)]),
            Some(MixMode::Tokens)
        );
        assert_eq!(
            select_mix_mode(&[entry(5.0, 0.0, 1.0, 1.0)]),
            Some(MixMode::Requests)
        );
        // Cost never drives a composition bar
        assert_eq!(
            select_mix_mode(&[entry(0.0, 0.0, 1.0, 2.0)]),
            Some(MixMode::Sessions)
        );
        assert_eq!(select_mix_mode(&[entry(0.0, 0.0, 1.0, 0.0)]), None);
    }

    #[test]
    fn test_select_burn_mode_preference() {
        assert_eq!(
            select_burn_mode(&[entry(5.0, 0.0, 1.0, 1.0)]),
            Some(MixMode::Cost)
        );
        assert_eq!(
            select_burn_mode(&[entry(5.0, 0.0, 0.0, 1.0)]),
            Some(MixMode::Requests)
        );
        assert_eq!(select_burn_mode(&[]), None);
    }

    #[test]
    fn test_mode_is_chosen_across_entries() {
        // One entry with tokens is enough to pick tokens for the whole bar
        let entries = [entry(5.0, 0.0, 0.0, 0.0), entry(0.0, 3.0, 0.0, 0.0)];
        assert_eq!(select_mix_mode(&entries), Some(MixMode::Tokens));
    }
}
