//! Cross-provider cost aggregation.

mod budget;
mod cost;
mod models;

pub use budget::{
    budget_percent, collect_budgets, is_budget_key, BudgetEntry, BudgetProjection,
    BUDGET_PERCENT_CEILING,
};
pub use cost::{
    extract_cost_data, representative_cost, sort_providers, CostData, CostSort,
    ProviderCostEntry, BURN_RATE_KEY, COST_KEYS,
};
pub use models::{collect_models, ModelCostEntry};

pub(crate) use models::{normalize_name, parse_raw_number, parse_token_prefix_key, ModelField};
