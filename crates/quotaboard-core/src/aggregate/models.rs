//! Per-model token and cost extraction.
//!
//! Providers report the same per-model facts under three conventions:
//!
//! 1. `model_<name>_{input,output}_tokens` / `model_<name>_cost[_usd]` metrics
//! 2. `{input,output}_tokens_<name>` metrics with an optional `<name>_cost_usd`
//! 3. string values in `raw` using the first convention's key shape
//!
//! They are alternate encodings, so an earlier convention's value is never
//! overwritten by a later one.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::snapshot::Snapshot;

static MODEL_SUFFIX_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^model_(.+)_(input_tokens|output_tokens|cost_usd|cost)$").unwrap()
});

static TOKEN_PREFIX_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(input|output)_tokens_(.+)$").unwrap());

/// Tokens and cost of one model at one account
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCostEntry {
    pub name: String,
    pub provider_id: String,
    pub account_id: String,
    pub input_tokens: f64,
    pub output_tokens: f64,
    /// `None` when no convention reported a cost
    pub cost: Option<f64>,
}

impl ModelCostEntry {
    pub fn total_tokens(&self) -> f64 {
        self.input_tokens + self.output_tokens
    }
}

/// Which field a key feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModelField {
    Input,
    Output,
    Cost,
}

/// Split a `model_<name>_<field>` key
pub(crate) fn parse_model_suffix_key(key: &str) -> Option<(String, ModelField)> {
    let caps = MODEL_SUFFIX_KEY.captures(key)?;
    let field = match &caps[2] {
        "input_tokens" => ModelField::Input,
        "output_tokens" => ModelField::Output,
        _ => ModelField::Cost,
    };
    Some((normalize_name(&caps[1]), field))
}

/// Split an `{input,output}_tokens_<name>` key
pub(crate) fn parse_token_prefix_key(key: &str) -> Option<(String, ModelField)> {
    let caps = TOKEN_PREFIX_KEY.captures(key)?;
    let field = if &caps[1] == "input" {
        ModelField::Input
    } else {
        ModelField::Output
    };
    Some((normalize_name(&caps[2]), field))
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Parse a number out of a raw string value ("1,234", "$5.20", " 42 ")
pub(crate) fn parse_raw_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '_'))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Default)]
struct ModelFields {
    input: Option<f64>,
    output: Option<f64>,
    cost: Option<f64>,
}

impl ModelFields {
    /// Populate a field unless an earlier convention already did
    fn fill(&mut self, field: ModelField, value: f64) {
        let slot = match field {
            ModelField::Input => &mut self.input,
            ModelField::Output => &mut self.output,
            ModelField::Cost => &mut self.cost,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn is_empty(&self) -> bool {
        self.input.unwrap_or(0.0) == 0.0
            && self.output.unwrap_or(0.0) == 0.0
            && self.cost.unwrap_or(0.0) == 0.0
    }
}

/// Merge all three conventions into one entry per model, sorted by name
pub fn collect_models(snapshot: &Snapshot) -> Vec<ModelCostEntry> {
    let mut models: BTreeMap<String, ModelFields> = BTreeMap::new();

    // Suffix style; `_cost` sorts before `_cost_usd`, so it wins the tie
    for (key, metric) in &snapshot.metrics {
        if let (Some((name, field)), Some(value)) = (parse_model_suffix_key(key), metric.used) {
            models.entry(name).or_default().fill(field, value);
        }
    }

    // Prefix style
    for (key, metric) in &snapshot.metrics {
        if let (Some((name, field)), Some(value)) = (parse_token_prefix_key(key), metric.used) {
            let fields = models.entry(name.clone()).or_default();
            fields.fill(field, value);
            if let Some(cost) = snapshot.metric_used(&format!("{}_cost_usd", name)) {
                fields.fill(ModelField::Cost, cost);
            }
        }
    }

    // String-valued raw source
    for (key, value) in &snapshot.raw {
        let Some((name, field)) = parse_model_suffix_key(key) else {
            continue;
        };
        match parse_raw_number(value) {
            Some(v) => models.entry(name).or_default().fill(field, v),
            None => tracing::debug!(
                account = %snapshot.account_id,
                key = %key,
                "ignoring unparsable raw model value"
            ),
        }
    }

    models
        .into_iter()
        .filter(|(_, f)| !f.is_empty())
        .map(|(name, f)| ModelCostEntry {
            name,
            provider_id: snapshot.provider_id.clone(),
            account_id: snapshot.account_id.clone(),
            input_tokens: f.input.unwrap_or(0.0),
            output_tokens: f.output.unwrap_or(0.0),
            cost: f.cost,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Metric;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_keys() {
        assert_eq!(
            parse_model_suffix_key("model_gpt4_cost_usd"),
            Some(("gpt4".to_string(), ModelField::Cost))
        );
        assert_eq!(
            parse_model_suffix_key("model_claude-3.5_input_tokens"),
            Some(("claude-3.5".to_string(), ModelField::Input))
        );
        assert_eq!(parse_model_suffix_key("model_gpt4_requests"), None);
        assert_eq!(
            parse_token_prefix_key("output_tokens_Claude"),
            Some(("claude".to_string(), ModelField::Output))
        );
    }

    #[test]
    fn test_parse_raw_number() {
        assert_eq!(parse_raw_number("1,234"), Some(1234.0));
        assert_eq!(parse_raw_number(" $5.20 "), Some(5.2));
        assert_eq!(parse_raw_number("lots"), None);
        assert_eq!(parse_raw_number("NaN"), None);
    }

    #[test]
    fn test_suffix_convention() {
        let snap = Snapshot::new("openai", "work")
            .with_metric("model_gpt4_cost_usd", Metric::from_used(50.0))
            .with_metric("model_gpt4_input_tokens", Metric::from_used(1000.0))
            .with_metric("model_gpt4_output_tokens", Metric::from_used(500.0));

        let models = collect_models(&snap);
        assert_eq!(
            models,
            vec![ModelCostEntry {
                name: "gpt4".to_string(),
                provider_id: "openai".to_string(),
                account_id: "work".to_string(),
                input_tokens: 1000.0,
                output_tokens: 500.0,
                cost: Some(50.0),
            }]
        );
    }

    #[test]
    fn test_same_value_in_two_conventions_is_not_doubled() {
        let snap = Snapshot::new("anthropic", "team")
            .with_metric("model_claude_input_tokens", Metric::from_used(2000.0))
            .with_metric("input_tokens_claude", Metric::from_used(2000.0))
            .with_raw("model_claude_input_tokens", "2000");

        let models = collect_models(&snap);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].input_tokens, 2000.0);
    }

    #[test]
    fn test_first_convention_wins_on_conflict() {
        let snap = Snapshot::new("anthropic", "team")
            .with_metric("model_claude_output_tokens", Metric::from_used(10.0))
            .with_metric("output_tokens_claude", Metric::from_used(99.0))
            .with_metric("input_tokens_claude", Metric::from_used(7.0));

        let models = collect_models(&snap);
        assert_eq!(models[0].output_tokens, 10.0);
        // Fields the first convention left empty are filled by later ones
        assert_eq!(models[0].input_tokens, 7.0);
    }

    #[test]
    fn test_cost_alternate_encodings() {
        let snap = Snapshot::new("openai", "work")
            .with_metric("model_x_cost", Metric::from_used(3.0))
            .with_metric("model_x_cost_usd", Metric::from_used(3.0));
        assert_eq!(collect_models(&snap)[0].cost, Some(3.0));
    }

    #[test]
    fn test_prefix_convention_cost_lookup() {
        let snap = Snapshot::new("anthropic", "team")
            .with_metric("input_tokens_claude", Metric::from_used(2000.0))
            .with_metric("claude_cost_usd", Metric::from_used(4.5));
        assert_eq!(collect_models(&snap)[0].cost, Some(4.5));
    }

    #[test]
    fn test_raw_only_and_zero_models() {
        let snap = Snapshot::new("gemini", "g")
            .with_raw("model_flash_input_tokens", "1,500")
            .with_raw("model_flash_output_tokens", "oops")
            .with_metric("model_idle_input_tokens", Metric::from_used(0.0));

        let models = collect_models(&snap);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "flash");
        assert_eq!(models[0].input_tokens, 1500.0);
        assert_eq!(models[0].output_tokens, 0.0);
        assert_eq!(models[0].cost, None);
    }
}
