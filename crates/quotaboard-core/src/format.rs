//! Pure text formatting helpers.
//!
//! Every helper takes borrowed input and returns a fresh `String`; widths are
//! terminal print widths, not byte or char counts.

use chrono::{DateTime, Duration, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::snapshot::Metric;

/// Marker appended to truncated text
pub const ELLIPSIS: &str = "…";

/// Marker for values that cannot be computed
pub const UNAVAILABLE: &str = "n/a";

/// Longest prefix of `s` whose print width does not exceed `width`
pub fn take_width(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

/// Truncate to `width` columns, ending with an ellipsis when cut
pub fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    format!("{}{}", take_width(s, width - 1), ELLIPSIS)
}

/// Right-pad to `width` columns (no truncation)
pub fn pad_right(s: &str, width: usize) -> String {
    let w = s.width();
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}

/// Left-pad to `width` columns (no truncation)
pub fn pad_left(s: &str, width: usize) -> String {
    let w = s.width();
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(width - w), s)
    }
}

/// Truncate then pad so the result is exactly `width` columns
pub fn fit(s: &str, width: usize) -> String {
    pad_right(&truncate(s, width), width)
}

/// Compact magnitude: 950, 1.2k, 3.4M, 1.1B
pub fn compact_number(value: f64) -> String {
    if !value.is_finite() {
        return UNAVAILABLE.to_string();
    }
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1_000_000_000.0 {
        format!("{}{:.1}B", sign, abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{}{:.1}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}{:.1}k", sign, abs / 1_000.0)
    } else if abs.fract() == 0.0 {
        format!("{}{}", sign, abs as u64)
    } else {
        format!("{}{:.1}", sign, abs)
    }
}

/// Money with a symbol for common currencies
pub fn money(value: f64, unit: &str) -> String {
    if !value.is_finite() {
        return UNAVAILABLE.to_string();
    }
    let symbol = match unit.to_ascii_uppercase().as_str() {
        "" | "USD" | "$" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        _ => return format!("{:.2} {}", value, unit),
    };
    if value < 0.0 {
        format!("-{}{:.2}", symbol, value.abs())
    } else {
        format!("{}{:.2}", symbol, value)
    }
}

/// Whole-number percent, or the unavailable marker
pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.0}%", v),
        _ => UNAVAILABLE.to_string(),
    }
}

/// Short human duration: "45s", "12m", "3h 12m", "2d 4h"
pub fn duration(d: Duration) -> String {
    let secs = d.num_seconds().max(0);
    let (days, hours, minutes) = (secs / 86_400, (secs % 86_400) / 3_600, (secs % 3_600) / 60);
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

/// Age of `at` relative to `now`, e.g. "12s ago"
pub fn age(now: DateTime<Utc>, at: DateTime<Utc>) -> String {
    if at.timestamp() == 0 {
        return "never".to_string();
    }
    let delta = now - at;
    if delta.num_seconds() < 1 {
        "just now".to_string()
    } else {
        format!("{} ago", duration(delta))
    }
}

/// Display value of a metric, choosing the best populated fields
pub fn metric_value(metric: &Metric) -> String {
    let num = |v: f64| {
        if metric.is_currency() {
            money(v, &metric.unit)
        } else {
            compact_number(v)
        }
    };

    if metric.is_percent_unit() {
        if let Some(used) = metric.used {
            return format!("{:.0}%", used);
        }
        if let Some(remaining) = metric.remaining {
            return format!("{:.0}% left", remaining);
        }
        return UNAVAILABLE.to_string();
    }

    let unit_suffix = if metric.unit.is_empty() || metric.is_currency() {
        String::new()
    } else {
        format!(" {}", metric.unit)
    };

    match (metric.used, metric.limit, metric.remaining) {
        (Some(used), Some(limit), _) => format!("{} / {}{}", num(used), num(limit), unit_suffix),
        (Some(used), None, _) => format!("{}{}", num(used), unit_suffix),
        (None, Some(limit), Some(remaining)) => {
            format!("{} / {}{} left", num(remaining), num(limit), unit_suffix)
        }
        (None, None, Some(remaining)) => format!("{}{} left", num(remaining), unit_suffix),
        _ => UNAVAILABLE.to_string(),
    }
}

/// Horizontal fill bar of exactly `width` cells for a ratio in `[0, 1]`
pub fn bar(ratio: f64, width: usize) -> (String, String) {
    let ratio = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = ((width as f64) * ratio).round() as usize;
    let filled = filled.min(width);
    ("█".repeat(filled), "░".repeat(width - filled))
}

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One cell per value, scaled to the largest; negative and non-finite
/// values draw as the lowest level
pub fn sparkline(values: &[f64]) -> String {
    let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
    let max = values.iter().copied().map(clean).fold(0.0, f64::max);
    values
        .iter()
        .map(|v| {
            let level = if max > 0.0 {
                (clean(*v) / max * 7.0).round() as usize
            } else {
                0
            };
            SPARK_LEVELS[level.min(7)]
        })
        .collect()
}

/// Safe division that yields 0 for a zero or invalid denominator
pub fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 && part.is_finite() {
        part / whole
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is a…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_fit_exact_width() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("日本語", 5).width(), 5);
    }

    #[test]
    fn test_compact_number() {
        assert_eq!(compact_number(950.0), "950");
        assert_eq!(compact_number(1_240.0), "1.2k");
        assert_eq!(compact_number(3_400_000.0), "3.4M");
        assert_eq!(compact_number(2.5), "2.5");
        assert_eq!(compact_number(f64::NAN), UNAVAILABLE);
    }

    #[test]
    fn test_money() {
        assert_eq!(money(12.346, "USD"), "$12.35");
        assert_eq!(money(3.0, "EUR"), "€3.00");
        assert_eq!(money(1.0, "CHF"), "1.00 CHF");
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration(Duration::seconds(45)), "45s");
        assert_eq!(duration(Duration::seconds(12 * 60 + 5)), "12m");
        assert_eq!(duration(Duration::seconds(3 * 3600 + 12 * 60)), "3h 12m");
        assert_eq!(duration(Duration::seconds(2 * 86_400 + 4 * 3600)), "2d 4h");
        assert_eq!(duration(Duration::seconds(-5)), "0s");
    }

    #[test]
    fn test_age() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 30).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(age(now, at), "30s ago");
        assert_eq!(age(now, now), "just now");
        assert_eq!(age(now, DateTime::<Utc>::default()), "never");
    }

    #[test]
    fn test_metric_value_shapes() {
        let cost = Metric::from_used(12.0).with_limit(50.0).with_unit("USD");
        assert_eq!(metric_value(&cost), "$12.00 / $50.00");

        let pct = Metric::from_used(42.0).with_unit("%");
        assert_eq!(metric_value(&pct), "42%");

        let left = Metric::from_remaining(300.0).with_unit("requests");
        assert_eq!(metric_value(&left), "300 requests left");

        assert_eq!(metric_value(&Metric::default()), UNAVAILABLE);
    }

    #[test]
    fn test_bar() {
        let (full, empty) = bar(0.5, 10);
        assert_eq!(full.chars().count(), 5);
        assert_eq!(empty.chars().count(), 5);
        let (full, empty) = bar(2.0, 4);
        assert_eq!((full.chars().count(), empty.chars().count()), (4, 0));
        let (full, _) = bar(f64::NAN, 4);
        assert!(full.is_empty());
    }

    #[test]
    fn test_ratio_guards_zero() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(ratio(5.0, 10.0), 0.5);
    }

    #[test]
    fn test_sparkline_scales_to_peak() {
        assert_eq!(sparkline(&[0.0, 5.0, 10.0]), "▁▅█");
        assert_eq!(sparkline(&[3.0, 3.0]), "██");
        assert_eq!(sparkline(&[0.0, -1.0, f64::NAN]), "▁▁▁");
        assert_eq!(sparkline(&[]), "");
    }
}
