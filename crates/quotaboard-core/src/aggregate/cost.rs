//! Cost roll-up across snapshots.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::budget::{collect_budgets, BudgetEntry};
use super::models::{collect_models, parse_model_suffix_key, ModelCostEntry, ModelField};
use crate::mix::palette::name_color;
use crate::paint::Color;
use crate::snapshot::{Snapshot, Status};

/// Top-level cost keys, highest priority first
pub const COST_KEYS: &[&str] = &[
    "total_cost_usd",
    "total_cost",
    "cost_usd",
    "cost",
    "spend_usd",
    "spend",
    "billing_cycle_cost",
    "monthly_cost",
];

/// Spend-per-hour metric
pub const BURN_RATE_KEY: &str = "burn_rate";

/// Cost summary of one account
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCostEntry {
    pub name: String,
    pub provider_id: String,
    pub account_id: String,
    pub cost: f64,
    pub burn_rate: f64,
    pub color: Color,
    pub status: Status,
    pub models: Vec<ModelCostEntry>,
    pub input_tokens: f64,
    pub output_tokens: f64,
}

impl ProviderCostEntry {
    pub fn total_tokens(&self) -> f64 {
        self.input_tokens + self.output_tokens
    }

    pub fn is_active(&self) -> bool {
        self.cost > 0.0 || self.total_tokens() > 0.0 || self.burn_rate > 0.0
    }
}

/// Aggregated analytics for one render pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostData {
    pub total_providers: usize,
    pub active_providers: usize,
    pub total_cost: f64,
    pub total_input_tokens: f64,
    pub total_output_tokens: f64,
    pub burn_rate: f64,
    pub providers: Vec<ProviderCostEntry>,
    pub budgets: Vec<BudgetEntry>,
}

impl CostData {
    pub fn total_tokens(&self) -> f64 {
        self.total_input_tokens + self.total_output_tokens
    }

    /// Models merged by name across accounts, sorted by name.
    ///
    /// Different accounts using the same model are separate usage, so their
    /// values add up.
    pub fn model_totals(&self) -> Vec<ModelCostEntry> {
        let mut merged: BTreeMap<String, ModelCostEntry> = BTreeMap::new();
        for model in self.providers.iter().flat_map(|p| p.models.iter()) {
            merged
                .entry(model.name.clone())
                .and_modify(|m| {
                    m.input_tokens += model.input_tokens;
                    m.output_tokens += model.output_tokens;
                    m.cost = match (m.cost, model.cost) {
                        (Some(a), Some(b)) => Some(a + b),
                        (a, b) => a.or(b),
                    };
                    if m.provider_id != model.provider_id {
                        m.provider_id = "mixed".to_string();
                    }
                    m.account_id.clear();
                })
                .or_insert_with(|| model.clone());
        }
        merged.into_values().collect()
    }
}

/// Ordering applied by callers before presenting providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CostSort {
    #[default]
    Cost,
    Name,
    Tokens,
}

impl CostSort {
    pub fn next(self) -> Self {
        match self {
            CostSort::Cost => CostSort::Name,
            CostSort::Name => CostSort::Tokens,
            CostSort::Tokens => CostSort::Cost,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CostSort::Cost => "Cost",
            CostSort::Name => "Name",
            CostSort::Tokens => "Tokens",
        }
    }
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Sort providers; ties fall back to name then account id
pub fn sort_providers(entries: &mut [ProviderCostEntry], sort: CostSort) {
    entries.sort_by(|a, b| {
        let primary = match sort {
            CostSort::Cost => desc(a.cost, b.cost),
            CostSort::Tokens => desc(a.total_tokens(), b.total_tokens()),
            CostSort::Name => Ordering::Equal,
        };
        primary
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.account_id.cmp(&b.account_id))
    });
}

/// Single cost figure for a snapshot.
///
/// The first present top-level cost key wins; otherwise per-model cost
/// metrics are summed (one value per model).
pub fn representative_cost(snapshot: &Snapshot) -> Option<f64> {
    if let Some(cost) = COST_KEYS.iter().find_map(|k| snapshot.metric_used(k)) {
        return Some(cost);
    }

    let mut per_model: BTreeMap<String, f64> = BTreeMap::new();
    for (key, metric) in &snapshot.metrics {
        if let (Some((name, ModelField::Cost)), Some(value)) =
            (parse_model_suffix_key(key), metric.used)
        {
            per_model.entry(name).or_insert(value);
        }
    }
    if per_model.is_empty() {
        None
    } else {
        Some(per_model.values().sum())
    }
}

/// Build cost analytics from the current snapshots.
///
/// `filter` is a case-insensitive substring matched against account and
/// provider ids; empty matches everything. Output order is unspecified;
/// callers sort with [`sort_providers`].
pub fn extract_cost_data<'a>(
    snapshots: impl IntoIterator<Item = &'a Snapshot>,
    filter: &str,
) -> CostData {
    let mut data = CostData::default();

    for snapshot in snapshots {
        if !snapshot.matches_filter(filter) {
            continue;
        }

        let cost = representative_cost(snapshot).unwrap_or(0.0);
        let burn_rate = snapshot.metric_used(BURN_RATE_KEY).unwrap_or(0.0);
        let models = collect_models(snapshot);

        let (input_tokens, output_tokens) = if models.is_empty() {
            (
                snapshot.metric_used("input_tokens").unwrap_or(0.0),
                snapshot.metric_used("output_tokens").unwrap_or(0.0),
            )
        } else {
            models.iter().fold((0.0, 0.0), |(i, o), m| {
                (i + m.input_tokens, o + m.output_tokens)
            })
        };

        let entry = ProviderCostEntry {
            name: snapshot.display_name().to_string(),
            provider_id: snapshot.provider_id.clone(),
            account_id: snapshot.account_id.clone(),
            cost,
            burn_rate,
            color: name_color(&snapshot.provider_id),
            status: snapshot.status,
            models,
            input_tokens,
            output_tokens,
        };

        data.total_providers += 1;
        if entry.is_active() {
            data.active_providers += 1;
        }
        data.total_cost += cost;
        data.total_input_tokens += input_tokens;
        data.total_output_tokens += output_tokens;
        data.burn_rate += burn_rate;
        data.budgets.extend(collect_budgets(snapshot, burn_rate));
        data.providers.push(entry);
    }

    data
}
