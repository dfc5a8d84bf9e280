//! Composition extraction from a snapshot's metric and raw keys.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::palette::mix_color;
use super::vendor::vendor_of;
use super::{select_burn_mode, select_mix_mode, MixDimension, MixEntry};
use crate::aggregate::{normalize_name, parse_raw_number, parse_token_prefix_key, ModelField};
use crate::paint::Color;
use crate::snapshot::{Snapshot, TimePoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Measure {
    Input,
    Output,
    Tokens,
    Cost,
    Requests,
    Sessions,
}

/// Measure suffixes; longer suffixes come before the ones they end with
const MEASURE_SUFFIXES: &[(&str, Measure)] = &[
    ("_input_tokens", Measure::Input),
    ("_output_tokens", Measure::Output),
    ("_tokens", Measure::Tokens),
    ("_cost_usd", Measure::Cost),
    ("_cost", Measure::Cost),
    ("_requests", Measure::Requests),
    ("_calls", Measure::Requests),
    ("_sessions", Measure::Sessions),
];

/// Split a `<dimension>_<name>_<measure>` key, plus the model-only
/// `{input,output}_tokens_<name>` form
fn parse_key(key: &str, dimension: MixDimension) -> Option<(String, Measure)> {
    if dimension == MixDimension::Model {
        if let Some((name, field)) = parse_token_prefix_key(key) {
            let measure = match field {
                ModelField::Input => Measure::Input,
                _ => Measure::Output,
            };
            return Some((name, measure));
        }
    }

    let rest = key.strip_prefix(dimension.key())?.strip_prefix('_')?;
    MEASURE_SUFFIXES.iter().find_map(|(suffix, measure)| {
        rest.strip_suffix(suffix)
            .filter(|name| !name.is_empty())
            .map(|name| (normalize_name(name), *measure))
    })
}

/// Per-entity values; the first encoding seen for a measure wins
#[derive(Debug, Default)]
struct Tally {
    input: Option<f64>,
    output: Option<f64>,
    tokens: Option<f64>,
    cost: Option<f64>,
    requests: Option<f64>,
    sessions: Option<f64>,
}

impl Tally {
    fn fill(&mut self, measure: Measure, value: f64) {
        let slot = match measure {
            Measure::Input => &mut self.input,
            Measure::Output => &mut self.output,
            Measure::Tokens => &mut self.tokens,
            Measure::Cost => &mut self.cost,
            Measure::Requests => &mut self.requests,
            Measure::Sessions => &mut self.sessions,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn into_entry(self, name: String) -> MixEntry {
        // An unsplit total is reported as input when no split exists
        let (input_tokens, output_tokens) = match (self.input, self.output, self.tokens) {
            (None, None, Some(total)) => (total, 0.0),
            (input, output, _) => (input.unwrap_or(0.0), output.unwrap_or(0.0)),
        };
        MixEntry {
            name,
            requests: self.requests.unwrap_or(0.0),
            sessions: self.sessions.unwrap_or(0.0),
            input_tokens,
            output_tokens,
            cost: self.cost.unwrap_or(0.0),
            series: Vec::new(),
            color: Color::Gray,
        }
    }
}

/// Break a snapshot's activity down by `dimension`.
///
/// Returns the non-zero entries, largest first in the selected mix measure,
/// and every metric/raw key consumed so later passes can skip them.
pub fn collect_mix(
    snapshot: &Snapshot,
    dimension: MixDimension,
) -> (Vec<MixEntry>, BTreeSet<String>) {
    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();
    let mut used_keys = BTreeSet::new();

    for (key, metric) in &snapshot.metrics {
        let Some((name, measure)) = parse_key(key, dimension) else {
            continue;
        };
        used_keys.insert(key.clone());
        if let Some(value) = metric.used {
            tallies.entry(name).or_default().fill(measure, value);
        }
    }

    for (key, value) in &snapshot.raw {
        let Some((name, measure)) = parse_key(key, dimension) else {
            continue;
        };
        used_keys.insert(key.clone());
        match parse_raw_number(value) {
            Some(v) => tallies.entry(name).or_default().fill(measure, v),
            None => tracing::debug!(
                account = %snapshot.account_id,
                key = %key,
                "ignoring unparsable raw mix value"
            ),
        }
    }

    if dimension == MixDimension::Vendor && tallies.is_empty() {
        return rollup_vendors(snapshot);
    }

    let mut entries: Vec<MixEntry> = tallies
        .into_iter()
        .map(|(name, tally)| tally.into_entry(name))
        .filter(|e| !e.is_zero())
        .collect();
    for entry in &mut entries {
        entry.series = series_for(snapshot, dimension, &entry.name);
    }

    finish(snapshot, dimension, entries, used_keys)
}

/// Vendor composition derived from the model composition
fn rollup_vendors(snapshot: &Snapshot) -> (Vec<MixEntry>, BTreeSet<String>) {
    let (models, used_keys) = collect_mix(snapshot, MixDimension::Model);

    let mut vendors: BTreeMap<String, MixEntry> = BTreeMap::new();
    for model in models {
        let vendor = vendor_of(&model.name);
        // Distinct models are separate usage, so they add up per vendor
        match vendors.get_mut(&vendor) {
            Some(v) => {
                v.requests += model.requests;
                v.sessions += model.sessions;
                v.input_tokens += model.input_tokens;
                v.output_tokens += model.output_tokens;
                v.cost += model.cost;
            }
            None => {
                vendors.insert(
                    vendor.clone(),
                    MixEntry {
                        name: vendor,
                        series: Vec::new(),
                        ..model
                    },
                );
            }
        }
    }

    let mut entries: Vec<MixEntry> = vendors.into_values().collect();
    for entry in &mut entries {
        entry.series = series_for(snapshot, MixDimension::Vendor, &entry.name);
    }
    finish(snapshot, MixDimension::Vendor, entries, used_keys)
}

/// Series keyed directly under the dimension, else (vendors only) the model
/// series re-bucketed per day
fn series_for(snapshot: &Snapshot, dimension: MixDimension, name: &str) -> Vec<TimePoint> {
    let direct_key = format!("usage_{}_{}", dimension.key(), name);
    if let Some(points) = snapshot
        .daily_series
        .iter()
        .find(|(key, _)| key.to_lowercase() == direct_key)
        .map(|(_, points)| points)
    {
        return points.clone();
    }

    if dimension != MixDimension::Vendor {
        return Vec::new();
    }

    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (key, points) in &snapshot.daily_series {
        let Some(model) = key.strip_prefix("usage_model_") else {
            continue;
        };
        if vendor_of(model) != name {
            continue;
        }
        for point in points {
            *buckets.entry(point.date).or_insert(0.0) += point.value;
        }
    }
    buckets
        .into_iter()
        .map(|(date, value)| TimePoint::new(date, value))
        .collect()
}

/// Order entries by the chosen measure and assign spread-out colors
fn finish(
    snapshot: &Snapshot,
    dimension: MixDimension,
    mut entries: Vec<MixEntry>,
    used_keys: BTreeSet<String>,
) -> (Vec<MixEntry>, BTreeSet<String>) {
    let mode = select_mix_mode(&entries).or_else(|| select_burn_mode(&entries));
    entries.sort_by(|a, b| {
        mode.map(|m| {
            b.measure(m)
                .partial_cmp(&a.measure(m))
                .unwrap_or(Ordering::Equal)
        })
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.name.cmp(&b.name))
    });
    for (position, entry) in entries.iter_mut().enumerate() {
        entry.color = mix_color(dimension.key(), &snapshot.account_id, position);
    }
    (entries, used_keys)
}
