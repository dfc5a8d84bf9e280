//! Per-provider display overrides.
//!
//! A registry is built once at start-up (built-in entries merged with any
//! configured ones) and then only read. Callers pass it to the classifier
//! and dashboard explicitly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paint::Color;

/// Error type for override configuration
#[derive(Debug, Error)]
pub enum OverrideError {
    /// A section definition has no name
    #[error("provider {provider}: section #{index} has an empty name")]
    EmptySectionName { provider: String, index: usize },

    /// A section definition matches no keys
    #[error("provider {provider}: section {name} declares no key prefixes")]
    EmptySectionPrefixes { provider: String, name: String },
}

/// Explicit display settings for one metric key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricOverride {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
}

/// A provider-defined metric group reusable across keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailSection {
    pub name: String,
    pub order: i32,
    /// Keys starting with any of these prefixes belong to the section
    #[serde(default)]
    pub key_prefixes: Vec<String>,
}

impl DetailSection {
    pub fn matches(&self, key: &str) -> bool {
        self.key_prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }
}

/// Accent color role declared by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccentRole {
    #[default]
    Neutral,
    Green,
    Orange,
    Blue,
    Magenta,
    Cyan,
    Yellow,
    Red,
}

impl AccentRole {
    pub fn color(&self) -> Color {
        match self {
            AccentRole::Neutral => Color::Gray,
            AccentRole::Green => Color::Rgb(16, 163, 127),
            AccentRole::Orange => Color::Rgb(217, 119, 87),
            AccentRole::Blue => Color::Rgb(66, 133, 244),
            AccentRole::Magenta => Color::Rgb(190, 110, 240),
            AccentRole::Cyan => Color::Cyan,
            AccentRole::Yellow => Color::Yellow,
            AccentRole::Red => Color::Red,
        }
    }
}

/// Display overrides for one provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderDisplay {
    /// Human-facing provider name
    #[serde(default)]
    pub name: Option<String>,
    /// Per-key group/label/order overrides
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricOverride>,
    /// Custom sections, matched in declaration order
    #[serde(default)]
    pub sections: Vec<DetailSection>,
    /// Metric keys that get a headline gauge, highest priority first
    #[serde(default)]
    pub gauge_priority: Vec<String>,
    /// Key prefixes suppressed when the metric is zero
    #[serde(default)]
    pub hide_zero_prefixes: Vec<String>,
    /// Exact keys suppressed when the metric is zero
    #[serde(default)]
    pub hide_zero_keys: Vec<String>,
    #[serde(default)]
    pub accent: AccentRole,
}

impl ProviderDisplay {
    /// Whether a zero-valued metric under `key` should be hidden
    pub fn hides_when_zero(&self, key: &str) -> bool {
        self.hide_zero_keys.iter().any(|k| k == key)
            || self
                .hide_zero_prefixes
                .iter()
                .any(|p| key.starts_with(p.as_str()))
    }

    /// Position of `key` in the gauge priority list
    pub fn gauge_rank(&self, key: &str) -> Option<usize> {
        self.gauge_priority.iter().position(|k| k == key)
    }

    /// Layer `other` on top of `self`; scalar fields in `other` win,
    /// keyed and list fields are extended
    pub fn merge(&mut self, other: ProviderDisplay) {
        if other.name.is_some() {
            self.name = other.name;
        }
        self.metrics.extend(other.metrics);
        for section in other.sections {
            self.sections.retain(|s| s.name != section.name);
            self.sections.push(section);
        }
        if !other.gauge_priority.is_empty() {
            self.gauge_priority = other.gauge_priority;
        }
        for prefix in other.hide_zero_prefixes {
            if !self.hide_zero_prefixes.contains(&prefix) {
                self.hide_zero_prefixes.push(prefix);
            }
        }
        for key in other.hide_zero_keys {
            if !self.hide_zero_keys.contains(&key) {
                self.hide_zero_keys.push(key);
            }
        }
        if other.accent != AccentRole::Neutral {
            self.accent = other.accent;
        }
    }

    fn validate(&self, provider: &str) -> Result<(), OverrideError> {
        for (index, section) in self.sections.iter().enumerate() {
            if section.name.trim().is_empty() {
                return Err(OverrideError::EmptySectionName {
                    provider: provider.to_string(),
                    index,
                });
            }
            if section.key_prefixes.is_empty() {
                return Err(OverrideError::EmptySectionPrefixes {
                    provider: provider.to_string(),
                    name: section.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Read-only lookup of provider display overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideRegistry {
    providers: BTreeMap<String, ProviderDisplay>,
    fallback: ProviderDisplay,
}

impl OverrideRegistry {
    /// Registry preloaded with the built-in provider entries
    pub fn builtin() -> Self {
        let mut providers = BTreeMap::new();

        providers.insert(
            "openai".to_string(),
            ProviderDisplay {
                name: Some("OpenAI".to_string()),
                gauge_priority: vec![
                    "rate_limit_requests".to_string(),
                    "rate_limit_tokens".to_string(),
                ],
                accent: AccentRole::Green,
                ..ProviderDisplay::default()
            },
        );

        providers.insert(
            "anthropic".to_string(),
            ProviderDisplay {
                name: Some("Anthropic".to_string()),
                metrics: BTreeMap::from([
                    (
                        "session_usage".to_string(),
                        MetricOverride {
                            group: Some("Usage".to_string()),
                            label: Some("Session (5h)".to_string()),
                            order: Some(1),
                        },
                    ),
                    (
                        "weekly_usage".to_string(),
                        MetricOverride {
                            group: Some("Usage".to_string()),
                            label: Some("Weekly".to_string()),
                            order: Some(1),
                        },
                    ),
                ]),
                gauge_priority: vec!["session_usage".to_string(), "weekly_usage".to_string()],
                accent: AccentRole::Orange,
                ..ProviderDisplay::default()
            },
        );

        providers.insert(
            "cursor".to_string(),
            ProviderDisplay {
                name: Some("Cursor".to_string()),
                metrics: BTreeMap::from([(
                    "plan_spend".to_string(),
                    MetricOverride {
                        label: Some("Plan Spend".to_string()),
                        ..MetricOverride::default()
                    },
                )]),
                sections: vec![DetailSection {
                    name: "Plan".to_string(),
                    order: 2,
                    key_prefixes: vec!["plan_".to_string()],
                }],
                gauge_priority: vec!["plan_spend".to_string(), "spend_limit".to_string()],
                hide_zero_prefixes: vec!["model_".to_string()],
                accent: AccentRole::Blue,
                ..ProviderDisplay::default()
            },
        );

        providers.insert(
            "openrouter".to_string(),
            ProviderDisplay {
                name: Some("OpenRouter".to_string()),
                metrics: BTreeMap::from([(
                    "credits".to_string(),
                    MetricOverride {
                        group: Some("Spending".to_string()),
                        label: Some("Credits".to_string()),
                        order: Some(2),
                    },
                )]),
                gauge_priority: vec!["credits".to_string()],
                accent: AccentRole::Magenta,
                ..ProviderDisplay::default()
            },
        );

        providers.insert(
            "copilot".to_string(),
            ProviderDisplay {
                name: Some("GitHub Copilot".to_string()),
                gauge_priority: vec![
                    "premium_requests".to_string(),
                    "chat_requests".to_string(),
                ],
                hide_zero_keys: vec!["chat_requests".to_string()],
                accent: AccentRole::Cyan,
                ..ProviderDisplay::default()
            },
        );

        providers.insert(
            "gemini".to_string(),
            ProviderDisplay {
                name: Some("Gemini".to_string()),
                gauge_priority: vec!["rate_limit_requests".to_string()],
                accent: AccentRole::Blue,
                ..ProviderDisplay::default()
            },
        );

        Self {
            providers,
            fallback: ProviderDisplay::default(),
        }
    }

    /// Merge configured entries over this registry
    pub fn with_overrides(
        mut self,
        overrides: BTreeMap<String, ProviderDisplay>,
    ) -> Result<Self, OverrideError> {
        for (id, display) in overrides {
            display.validate(&id)?;
            self.providers.entry(id).or_default().merge(display);
        }
        Ok(self)
    }

    /// Overrides for `provider_id`, or an empty entry
    pub fn get(&self, provider_id: &str) -> &ProviderDisplay {
        self.providers.get(provider_id).unwrap_or(&self.fallback)
    }

    /// Display name for a provider id
    pub fn provider_name<'a>(&'a self, provider_id: &'a str) -> &'a str {
        self.get(provider_id)
            .name
            .as_deref()
            .unwrap_or(provider_id)
    }
}
