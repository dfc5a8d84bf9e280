//! Model-to-vendor inference.

/// Model name prefixes and the vendor that ships them
const VENDOR_PREFIXES: &[(&str, &str)] = &[
    ("gpt", "openai"),
    ("o1", "openai"),
    ("o3", "openai"),
    ("o4", "openai"),
    ("codex", "openai"),
    ("claude", "anthropic"),
    ("gemini", "google"),
    ("gemma", "google"),
    ("llama", "meta"),
    ("mistral", "mistral"),
    ("mixtral", "mistral"),
    ("codestral", "mistral"),
    ("deepseek", "deepseek"),
    ("grok", "xai"),
    ("qwen", "alibaba"),
    ("kimi", "moonshot"),
];

/// Vendor of a model name; `vendor/model` names carry it explicitly
pub fn vendor_of(model: &str) -> String {
    let lower = model.trim().to_lowercase();
    if let Some((vendor, _)) = lower.split_once('/') {
        if !vendor.is_empty() {
            return vendor.to_string();
        }
    }
    VENDOR_PREFIXES
        .iter()
        .find(|(prefix, _)| lower.starts_with(prefix))
        .map(|(_, vendor)| (*vendor).to_string())
        .unwrap_or_else(|| "other".to_string())
}
