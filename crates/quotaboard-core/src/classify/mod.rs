//! Metric classification.
//!
//! Maps every raw metric key onto exactly one display group with a label and
//! an ordering key. Resolution order: explicit per-key override, provider
//! section, built-in rule table, then the `Activity` default.

mod label;
pub mod rules;

use std::collections::{BTreeMap, BTreeSet};

use crate::overrides::ProviderDisplay;
use crate::snapshot::{Metric, Snapshot};

pub use label::prettify_key;

pub const GROUP_USAGE: &str = "Usage";
pub const GROUP_SPENDING: &str = "Spending";
pub const GROUP_TOKENS: &str = "Tokens";
pub const GROUP_ACTIVITY: &str = "Activity";

/// Order used when nothing more specific applies
pub const DEFAULT_ORDER: i32 = 4;

/// Canonical order of the built-in groups
pub fn canonical_order(group: &str) -> i32 {
    match group {
        GROUP_USAGE => 1,
        GROUP_SPENDING => 2,
        GROUP_TOKENS => 3,
        _ => DEFAULT_ORDER,
    }
}

/// Result of classifying one metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub group: String,
    pub label: String,
    pub order: i32,
}

/// Classify a metric key for one provider.
///
/// Total and deterministic: unknown keys land in `Activity`.
pub fn classify(key: &str, metric: &Metric, display: &ProviderDisplay) -> Classification {
    let explicit = display.metrics.get(key);
    let label = explicit
        .and_then(|o| o.label.clone())
        .unwrap_or_else(|| prettify_key(key));

    if let Some(group) = explicit.and_then(|o| o.group.clone()) {
        let order = explicit.and_then(|o| o.order).unwrap_or(DEFAULT_ORDER);
        return Classification {
            group,
            label,
            order,
        };
    }

    let (group, order) = resolve_group(key, metric, display);
    Classification {
        group,
        label,
        order: explicit.and_then(|o| o.order).unwrap_or(order),
    }
}

fn resolve_group(key: &str, metric: &Metric, display: &ProviderDisplay) -> (String, i32) {
    if let Some(section) = display.sections.iter().find(|s| s.matches(key)) {
        return (section.name.clone(), section.order);
    }
    if let Some(rule) = rules::first_match(key, metric) {
        let order = rule.order.unwrap_or_else(|| canonical_order(rule.group));
        return (rule.group.to_string(), order);
    }
    (GROUP_ACTIVITY.to_string(), DEFAULT_ORDER)
}

/// One classified metric inside a group
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEntry {
    pub key: String,
    pub label: String,
    pub order: i32,
    pub metric: Metric,
}

/// A display group of classified metrics
#[derive(Debug, Clone, PartialEq)]
pub struct MetricGroup {
    pub name: String,
    /// Smallest order among the group's entries
    pub order: i32,
    /// Entries sorted by key
    pub entries: Vec<MetricEntry>,
}

/// Classify and bucket a snapshot's metrics.
///
/// Keys in `skip` are omitted (already shown elsewhere), as are zero values the
/// provider asked to hide. Groups are sorted by `(order, name)`.
pub fn group_metrics(
    snapshot: &Snapshot,
    display: &ProviderDisplay,
    skip: &BTreeSet<String>,
) -> Vec<MetricGroup> {
    let mut buckets: BTreeMap<String, MetricGroup> = BTreeMap::new();

    // BTreeMap iteration keeps entries sorted by key
    for (key, metric) in &snapshot.metrics {
        if skip.contains(key) || (metric.is_zero() && display.hides_when_zero(key)) {
            continue;
        }
        let class = classify(key, metric, display);
        let group = buckets
            .entry(class.group.clone())
            .or_insert_with(|| MetricGroup {
                name: class.group.clone(),
                order: class.order,
                entries: Vec::new(),
            });
        group.order = group.order.min(class.order);
        group.entries.push(MetricEntry {
            key: key.clone(),
            label: class.label,
            order: class.order,
            metric: metric.clone(),
        });
    }

    let mut groups: Vec<MetricGroup> = buckets.into_values().collect();
    groups.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
    groups
}
