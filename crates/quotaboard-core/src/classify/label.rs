//! Key-to-label prettifier.

/// Words rendered in upper case rather than title case
const ACRONYMS: &[&str] = &[
    "api", "ai", "cli", "gpt", "id", "ide", "llm", "mcp", "rpm", "tpm", "ui", "usd",
];

/// Turn a snake_case metric key into a Title Case label.
///
/// `rate_limit_rpm` → `Rate Limit RPM`, `model_gpt4_cost_usd` → `Model GPT4 Cost USD`.
pub fn prettify_key(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(prettify_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn prettify_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if ACRONYMS.contains(&lower.as_str()) {
        return lower.to_ascii_uppercase();
    }
    // Acronym followed by a version number: gpt4, gpt4o
    for acronym in ACRONYMS {
        if let Some(rest) = lower.strip_prefix(acronym) {
            if rest.starts_with(|c: char| c.is_ascii_digit()) {
                return format!("{}{}", acronym.to_ascii_uppercase(), rest);
            }
        }
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prettify_key() {
        assert_eq!(prettify_key("total_cost_usd"), "Total Cost USD");
        assert_eq!(prettify_key("rate_limit_rpm"), "Rate Limit RPM");
        assert_eq!(prettify_key("model_gpt4_input_tokens"), "Model GPT4 Input Tokens");
        assert_eq!(prettify_key("api-calls"), "API Calls");
        assert_eq!(prettify_key("__odd__key"), "Odd Key");
        assert_eq!(prettify_key(""), "");
    }

    #[test]
    fn test_prettify_keeps_non_acronym_prefixes() {
        // "aim" starts with "ai" but is not followed by a digit
        assert_eq!(prettify_key("aim_score"), "Aim Score");
    }
}
