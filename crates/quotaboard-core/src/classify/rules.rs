//! Built-in classification rules.
//!
//! Rules are evaluated top to bottom; the first predicate that matches a key
//! decides its group. An `order` of `None` means the group's canonical order.

use super::{GROUP_ACTIVITY, GROUP_SPENDING, GROUP_TOKENS, GROUP_USAGE};
use crate::snapshot::Metric;

/// One entry of the rule table
pub struct Rule {
    /// Stable identifier, used in logs and tests
    pub name: &'static str,
    pub matches: fn(&str, &Metric) -> bool,
    pub group: &'static str,
    pub order: Option<i32>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("order", &self.order)
            .finish()
    }
}

/// Suffixes that mark a per-key cost value
const COST_SUFFIXES: &[&str] = &["_cost", "_cost_usd"];

/// Key fragments that mark money budgets and balances
const SPEND_FRAGMENTS: &[&str] = &["spend", "budget", "credit", "billing"];

/// Suffixes of request/session counters
const COUNTER_SUFFIXES: &[&str] = &["_requests", "_messages", "_sessions", "_calls"];

pub const RULES: &[Rule] = &[
    Rule {
        name: "rate_limit",
        matches: |key, _| key.starts_with("rate_limit_"),
        group: GROUP_USAGE,
        order: Some(1),
    },
    Rule {
        name: "percent_unit",
        matches: |_, m| m.is_percent_unit(),
        group: GROUP_USAGE,
        order: None,
    },
    Rule {
        name: "cost_suffix",
        matches: |key, _| key == "cost" || COST_SUFFIXES.iter().any(|s| key.ends_with(s)),
        group: GROUP_SPENDING,
        order: None,
    },
    Rule {
        name: "currency_unit",
        matches: |_, m| m.is_currency(),
        group: GROUP_SPENDING,
        order: None,
    },
    Rule {
        name: "spend_fragment",
        matches: |key, _| SPEND_FRAGMENTS.iter().any(|f| key.contains(f)),
        group: GROUP_SPENDING,
        order: None,
    },
    Rule {
        name: "quota_shape",
        matches: |_, m| m.limit.is_some() && m.is_meaningful(),
        group: GROUP_USAGE,
        order: None,
    },
    Rule {
        name: "model_tokens",
        matches: |key, _| {
            key.starts_with("model_")
                && (key.ends_with("_input_tokens") || key.ends_with("_output_tokens"))
        },
        group: GROUP_TOKENS,
        order: None,
    },
    Rule {
        name: "token_prefix",
        matches: |key, _| key.starts_with("input_tokens_") || key.starts_with("output_tokens_"),
        group: GROUP_TOKENS,
        order: None,
    },
    Rule {
        name: "token_fragment",
        matches: |key, _| key.contains("token"),
        group: GROUP_TOKENS,
        order: None,
    },
    Rule {
        name: "session_prefix",
        matches: |key, _| key.starts_with("session_"),
        group: GROUP_ACTIVITY,
        order: None,
    },
    Rule {
        name: "counter_suffix",
        matches: |key, _| COUNTER_SUFFIXES.iter().any(|s| key.ends_with(s)),
        group: GROUP_ACTIVITY,
        order: None,
    },
];

/// First rule matching `key`/`metric`
pub fn first_match(key: &str, metric: &Metric) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.matches)(key, metric))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_name(key: &str, metric: &Metric) -> Option<&'static str> {
        first_match(key, metric).map(|r| r.name)
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }

    #[test]
    fn test_rate_limit_beats_quota_shape() {
        let m = Metric::from_used(10.0).with_limit(100.0);
        assert_eq!(rule_name("rate_limit_requests", &m), Some("rate_limit"));
        assert_eq!(rule_name("premium_requests", &m), Some("quota_shape"));
    }

    #[test]
    fn test_cost_rules() {
        let plain = Metric::from_used(3.0);
        assert_eq!(rule_name("model_gpt4_cost_usd", &plain), Some("cost_suffix"));
        assert_eq!(rule_name("cost", &plain), Some("cost_suffix"));
        let usd = Metric::from_used(3.0).with_unit("USD");
        assert_eq!(rule_name("today", &usd), Some("currency_unit"));
        assert_eq!(rule_name("monthly_budget", &plain), Some("spend_fragment"));
    }

    #[test]
    fn test_token_rules() {
        let m = Metric::from_used(100.0);
        assert_eq!(rule_name("model_claude_input_tokens", &m), Some("model_tokens"));
        assert_eq!(rule_name("output_tokens_claude", &m), Some("token_prefix"));
        assert_eq!(rule_name("cached_tokens", &m), Some("token_fragment"));
    }

    #[test]
    fn test_activity_rules() {
        let m = Metric::from_used(4.0);
        assert_eq!(rule_name("session_count", &m), Some("session_prefix"));
        assert_eq!(rule_name("tool_calls", &m), Some("counter_suffix"));
        assert_eq!(rule_name("mystery", &m), None);
    }
}
