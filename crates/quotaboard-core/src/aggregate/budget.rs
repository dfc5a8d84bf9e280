//! Budget extraction and spend projection.

use chrono::{DateTime, Utc};

use crate::classify::prettify_key;
use crate::snapshot::Snapshot;

/// Highest percent a budget can report once over its limit
pub const BUDGET_PERCENT_CEILING: f64 = 200.0;

/// Spend-limit style keys; these win over plan-spend keys for one account
fn is_spend_limit_key(key: &str) -> bool {
    key == "spend_limit" || key.ends_with("_spend_limit")
}

fn is_plan_spend_key(key: &str) -> bool {
    key == "plan_spend" || key.ends_with("_plan_spend")
}

/// Keys whose used/limit pair describes a budget
pub fn is_budget_key(key: &str) -> bool {
    is_spend_limit_key(key)
        || is_plan_spend_key(key)
        || key == "monthly_budget"
        || key.ends_with("_budget")
        || key == "credits"
        || key == "credit_balance"
}

/// Percent of `limit` consumed, clamped to `[0, BUDGET_PERCENT_CEILING]`
pub fn budget_percent(used: f64, limit: f64) -> f64 {
    if limit <= 0.0 || !used.is_finite() {
        return 0.0;
    }
    (used / limit * 100.0).clamp(0.0, BUDGET_PERCENT_CEILING)
}

/// One budget of one account
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetEntry {
    /// "<account> <label>"
    pub name: String,
    pub provider_id: String,
    pub account_id: String,
    /// Metric key the budget came from
    pub key: String,
    pub used: f64,
    pub limit: f64,
    pub percent: f64,
    /// Spend per hour of the owning account
    pub burn_rate: f64,
    pub unit: String,
    pub resets_at: Option<DateTime<Utc>>,
}

/// Where a budget is heading at the current burn rate
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProjection {
    /// Hours until the limit is reached; `None` when nothing is burning
    pub hours_to_limit: Option<f64>,
    /// Spend expected by the reset time
    pub projected_used: Option<f64>,
    pub projected_percent: Option<f64>,
    /// Already over, or projected to go over before the reset
    pub exceeds_limit: bool,
}

impl BudgetEntry {
    pub fn remaining(&self) -> f64 {
        (self.limit - self.used).max(0.0)
    }

    /// Project spend forward from `now` using the burn rate
    pub fn projection(&self, now: DateTime<Utc>) -> BudgetProjection {
        let remaining = self.remaining();
        let hours_to_limit = if remaining <= 0.0 {
            Some(0.0)
        } else if self.burn_rate > 0.0 {
            Some(remaining / self.burn_rate)
        } else {
            None
        };

        let hours_to_reset = self
            .resets_at
            .map(|at| (at - now).num_seconds().max(0) as f64 / 3600.0);
        let projected_used = hours_to_reset.map(|h| self.used + self.burn_rate.max(0.0) * h);
        let projected_percent = projected_used.map(|p| budget_percent(p, self.limit));

        let exceeds_limit = self.used >= self.limit
            || projected_used.is_some_and(|p| p > self.limit)
            || matches!(
                (hours_to_limit, hours_to_reset),
                (Some(to_limit), Some(to_reset)) if to_limit < to_reset
            );

        BudgetProjection {
            hours_to_limit,
            projected_used,
            projected_percent,
            exceeds_limit,
        }
    }
}

/// Budget entries of one snapshot, de-duplicated
pub fn collect_budgets(snapshot: &Snapshot, burn_rate: f64) -> Vec<BudgetEntry> {
    let mut budgets: Vec<BudgetEntry> = snapshot
        .metrics
        .iter()
        .filter(|(key, _)| is_budget_key(key))
        .filter_map(|(key, metric)| {
            let limit = metric.limit.filter(|l| *l > 0.0)?;
            let used = metric
                .used
                .or_else(|| metric.remaining.map(|r| limit - r))?;
            Some(BudgetEntry {
                name: format!("{} {}", snapshot.display_name(), prettify_key(key)),
                provider_id: snapshot.provider_id.clone(),
                account_id: snapshot.account_id.clone(),
                key: key.clone(),
                used,
                limit,
                percent: budget_percent(used, limit),
                burn_rate,
                unit: metric.unit.clone(),
                resets_at: snapshot.resets.get(key).copied(),
            })
        })
        .collect();

    // A spend limit and a plan spend report the same money for one account
    if budgets.iter().any(|b| is_spend_limit_key(&b.key)) {
        budgets.retain(|b| !is_plan_spend_key(&b.key));
    }
    budgets
}
