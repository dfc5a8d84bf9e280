//! One account rendered as a bordered tile of fixed size.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::{label_value, RenderContext};
use crate::aggregate::{collect_models, representative_cost, BURN_RATE_KEY, COST_KEYS};
use crate::classify::{classify, group_metrics, prettify_key, GROUP_USAGE};
use crate::format;
use crate::layout::{fit_sections, GridLayout, SectionKind, TileSection, BORDER_HEIGHT};
use crate::mix::{collect_mix, select_mix_mode, MixDimension, MixEntry, MixMode};
use crate::overrides::{OverrideRegistry, ProviderDisplay};
use crate::paint::{Color, Line, Span, Style};
use crate::snapshot::{Metric, Snapshot};
use crate::status::{effective_status, gauge_tone, lowest_remaining, status_tone, Tone};

/// Gauges shown per tile at most
const MAX_GAUGES: usize = 3;
/// Message lines shown per tile at most
const MAX_MESSAGE_LINES: usize = 2;
/// Days drawn in a composition trend line
const TREND_DAYS: usize = 14;

/// Build a tile of exactly `layout.tile_height` lines, each
/// `layout.outer_width()` columns wide
pub(super) fn build(
    snapshot: &Snapshot,
    registry: &OverrideRegistry,
    ctx: &RenderContext,
    layout: &GridLayout,
    selected: bool,
) -> Vec<Line> {
    let height = layout.tile_height;
    let width = layout.tile_width;
    if height < BORDER_HEIGHT {
        return vec![Line::raw(" ".repeat(layout.outer_width())); height];
    }

    let display = registry.get(&snapshot.provider_id);
    let border = if selected {
        Style::fg(display.accent.color()).bold()
    } else {
        Style::fg(Color::DarkGray)
    };

    let mut inner = header(snapshot, registry, display, selected);
    inner.extend(fit_sections(
        body_sections(snapshot, display, ctx, width),
        layout.body_height,
    ));
    inner.push(footer(snapshot, ctx));
    inner.resize_with(height - BORDER_HEIGHT, Line::new);

    let mut lines = Vec::with_capacity(height);
    lines.push(Line::styled(format!("╭{}╮", "─".repeat(width)), border));
    for line in inner {
        let mut framed = Line::styled("│", border);
        framed.spans.extend(line.fit(width).spans);
        framed.push(Span::styled("│", border));
        lines.push(framed);
    }
    lines.push(Line::styled(format!("╰{}╯", "─".repeat(width)), border));
    lines
}

fn header(
    snapshot: &Snapshot,
    registry: &OverrideRegistry,
    display: &ProviderDisplay,
    selected: bool,
) -> Vec<Line> {
    let provider = registry.provider_name(&snapshot.provider_id);
    let account = snapshot.display_name();

    let mut title = Line::new();
    if selected {
        title.push(Span::styled("▸ ", Style::fg(display.accent.color()).bold()));
    }
    title.push(Span::styled(provider, Style::fg(display.accent.color()).bold()));
    if !account.eq_ignore_ascii_case(provider) {
        title.push(Span::styled(" · ", Style::default().dim()));
        title.push(Span::raw(account));
    }

    let status = effective_status(snapshot, display);
    let mut status_line = Line::styled(
        format!("{} {}", status.indicator(), status.label()),
        status_tone(status).style(),
    );
    if let Some((_, remaining)) = lowest_remaining(snapshot, display) {
        status_line.push(Span::styled(" · ", Style::default().dim()));
        status_line.push(Span::styled(
            format!("{} left", format::percent(Some(remaining.max(0.0)))),
            gauge_tone(Some(remaining)).style(),
        ));
    }

    vec![title, status_line]
}

fn footer(snapshot: &Snapshot, ctx: &RenderContext) -> Line {
    Line::styled(
        format!("updated {}", format::age(ctx.now, snapshot.timestamp)),
        Style::fg(Color::DarkGray),
    )
}

/// Body sections in priority order. Keys shown by an earlier section are
/// skipped by the metric rows.
fn body_sections(
    snapshot: &Snapshot,
    display: &ProviderDisplay,
    ctx: &RenderContext,
    width: usize,
) -> Vec<TileSection> {
    let mut used = BTreeSet::new();
    let gauges = gauges(snapshot, display, width, &mut used);
    let headline = headline(snapshot, &mut used);
    let composition = composition(snapshot, width, &mut used);
    let metrics = metric_rows(snapshot, display, width, &used);

    vec![
        TileSection::new(SectionKind::Gauges, gauges),
        TileSection::new(SectionKind::Headline, headline),
        TileSection::new(SectionKind::Composition, composition),
        TileSection::new(SectionKind::Metrics, metrics),
        TileSection::new(SectionKind::Message, message(snapshot)),
        TileSection::new(SectionKind::Metadata, metadata(snapshot, width)),
        TileSection::new(SectionKind::Resets, resets(snapshot, display, ctx, width)),
    ]
}

/// Keys that get a gauge: the provider's priority list when any of those
/// keys are present, otherwise every usage metric with a known percentage
fn gauge_keys<'s>(
    snapshot: &'s Snapshot,
    display: &ProviderDisplay,
) -> Vec<(&'s String, &'s Metric)> {
    let candidates = snapshot
        .metrics
        .iter()
        .filter(|(_, m)| m.percent().is_some());

    let mut ranked: Vec<_> = candidates
        .clone()
        .filter_map(|(k, m)| display.gauge_rank(k).map(|rank| (rank, k, m)))
        .collect();
    if !ranked.is_empty() {
        ranked.sort_by_key(|(rank, _, _)| *rank);
        return ranked
            .into_iter()
            .take(MAX_GAUGES)
            .map(|(_, k, m)| (k, m))
            .collect();
    }

    candidates
        .filter(|(k, m)| classify(k, m, display).group == GROUP_USAGE)
        .take(MAX_GAUGES)
        .collect()
}

fn gauges(
    snapshot: &Snapshot,
    display: &ProviderDisplay,
    width: usize,
    used: &mut BTreeSet<String>,
) -> Vec<Line> {
    let label_width = (width / 3).clamp(6, 16).min(width);
    let pct_width = 4;
    let bar_width = width.saturating_sub(label_width + pct_width + 2);

    gauge_keys(snapshot, display)
        .into_iter()
        .map(|(key, metric)| {
            used.insert(key.clone());
            let label = classify(key, metric, display).label;
            let remaining = metric.percent();
            let tone = gauge_tone(remaining);

            let mut line = Line::raw(format::fit(&label, label_width)).with(Span::raw(" "));
            if bar_width >= 3 {
                let ratio = remaining.unwrap_or(0.0) / 100.0;
                let (filled, empty) = format::bar(ratio, bar_width);
                line.push(Span::styled(filled, tone.style()));
                line.push(Span::styled(empty, Style::fg(Color::DarkGray)));
                line.push(Span::raw(" "));
            }
            line.with(Span::styled(
                format::pad_left(&format::percent(remaining.map(|p| p.max(0.0))), pct_width),
                tone.style(),
            ))
        })
        .collect()
}

/// Cost, tokens and burn rate on one line
fn headline(snapshot: &Snapshot, used: &mut BTreeSet<String>) -> Vec<Line> {
    let cost = representative_cost(snapshot);
    let burn_rate = snapshot.metric_used(BURN_RATE_KEY).filter(|b| *b > 0.0);
    let models = collect_models(snapshot);
    let tokens = if models.is_empty() {
        snapshot.metric_used("input_tokens").unwrap_or(0.0)
            + snapshot.metric_used("output_tokens").unwrap_or(0.0)
    } else {
        models.iter().map(|m| m.total_tokens()).sum()
    };

    let unit = COST_KEYS
        .iter()
        .find_map(|k| snapshot.metrics.get(*k))
        .map(|m| m.unit.as_str())
        .unwrap_or("USD");

    let mut parts: Vec<Span> = Vec::new();
    if let Some(cost) = cost {
        parts.push(Span::styled(format::money(cost, unit), Style::default().bold()));
    }
    if tokens > 0.0 {
        parts.push(Span::raw(format!("{} tok", format::compact_number(tokens))));
    }
    if let Some(rate) = burn_rate {
        parts.push(Span::styled(
            format!("{}/h", format::money(rate, unit)),
            Style::fg(Color::Yellow),
        ));
    }
    if parts.is_empty() {
        return Vec::new();
    }

    for key in COST_KEYS
        .iter()
        .copied()
        .chain([BURN_RATE_KEY, "input_tokens", "output_tokens"])
    {
        if snapshot.metrics.contains_key(key) {
            used.insert(key.to_string());
        }
    }

    let mut line = Line::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            line.push(Span::styled(" · ", Style::default().dim()));
        }
        line.push(part);
    }
    vec![line]
}

/// Title, stacked bar, legend and daily trend for each dimension with
/// activity. Only keys of a drawn dimension count as used.
fn composition(snapshot: &Snapshot, width: usize, used: &mut BTreeSet<String>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut model_keys = BTreeSet::new();

    for dimension in MixDimension::ALL {
        let (entries, keys) = collect_mix(snapshot, dimension);
        if dimension == MixDimension::Model {
            model_keys = keys.clone();
        }
        // A single vendor rolled up from the models repeats the model bar
        if dimension == MixDimension::Vendor
            && !keys.is_empty()
            && keys.is_subset(&model_keys)
            && entries.len() <= 1
        {
            continue;
        }
        let Some(mode) = select_mix_mode(&entries) else {
            continue;
        };
        used.extend(keys);
        let total: f64 = entries.iter().map(|e| e.measure(mode)).sum();

        lines.push(
            Line::styled(dimension.display_name(), Style::default().bold())
                .with(Span::styled(
                    format!(" by {}", mode.display_name()),
                    Style::default().dim(),
                ))
                .with(Span::raw(format!(" · {}", format::compact_number(total)))),
        );
        lines.push(stacked_bar(&entries, mode, total, width));
        lines.push(legend(&entries, mode, total));
        lines.extend(trend(&entries));
    }
    lines
}

/// Sparkline of the dimension's per-day total over the recent days
fn trend(entries: &[MixEntry]) -> Option<Line> {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for point in entries.iter().flat_map(|e| &e.series) {
        *per_day.entry(point.date).or_insert(0.0) += point.value;
    }
    let values: Vec<f64> = per_day.into_values().collect();
    let recent = &values[values.len().saturating_sub(TREND_DAYS)..];
    let last = *recent.last()?;

    Some(
        Line::styled("trend ", Style::default().dim())
            .with(Span::styled(format::sparkline(recent), Style::fg(Color::Cyan)))
            .with(Span::styled(
                format!(" {} last day", format::compact_number(last)),
                Style::default().dim(),
            )),
    )
}

/// Bar of exactly `width` cells split by share; cumulative rounding keeps
/// the segment sum equal to the width
fn stacked_bar(entries: &[MixEntry], mode: MixMode, total: f64, width: usize) -> Line {
    let mut line = Line::new();
    let mut cumulative = 0.0;
    let mut drawn = 0;
    for entry in entries {
        cumulative += entry.measure(mode);
        let end = (format::ratio(cumulative, total) * width as f64).round() as usize;
        let end = end.min(width);
        if end > drawn {
            line.push(Span::styled("█".repeat(end - drawn), Style::fg(entry.color)));
            drawn = end;
        }
    }
    if drawn < width {
        line.push(Span::styled("░".repeat(width - drawn), Style::fg(Color::DarkGray)));
    }
    line
}

fn legend(entries: &[MixEntry], mode: MixMode, total: f64) -> Line {
    let mut line = Line::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            line.push(Span::raw("  "));
        }
        line.push(Span::styled("■ ", Style::fg(entry.color)));
        line.push(Span::raw(format!(
            "{} {}",
            entry.name,
            format::percent(Some(format::ratio(entry.measure(mode), total) * 100.0))
        )));
        // Cost keys are consumed with the dimension, so the legend carries them
        if entry.cost > 0.0 {
            line.push(Span::styled(
                format!(" {}", format::money(entry.cost, "USD")),
                Style::default().dim(),
            ));
        }
    }
    line
}

fn metric_rows(
    snapshot: &Snapshot,
    display: &ProviderDisplay,
    width: usize,
    used: &BTreeSet<String>,
) -> Vec<Line> {
    let mut lines = Vec::new();
    for group in group_metrics(snapshot, display, used) {
        lines.push(Line::styled(group.name, Style::default().bold().dim()));
        for entry in group.entries {
            lines.push(label_value(
                &entry.label,
                Span::raw(format::metric_value(&entry.metric)),
                width,
            ));
        }
    }
    lines
}

fn message(snapshot: &Snapshot) -> Vec<Line> {
    let Some(message) = snapshot.message.as_deref() else {
        return Vec::new();
    };
    let tone = if snapshot.status.is_healthy() {
        Tone::Muted
    } else {
        Tone::Bad
    };
    message
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(MAX_MESSAGE_LINES)
        .map(|l| Line::styled(l.trim(), tone.style()))
        .collect()
}

fn metadata(snapshot: &Snapshot, width: usize) -> Vec<Line> {
    snapshot
        .attributes
        .iter()
        .filter(|(key, value)| key.as_str() != "account_name" && !value.is_empty())
        .map(|(key, value)| {
            label_value(
                &prettify_key(key),
                Span::styled(value.clone(), Style::fg(Color::Gray)),
                width,
            )
        })
        .collect()
}

fn resets(
    snapshot: &Snapshot,
    display: &ProviderDisplay,
    ctx: &RenderContext,
    width: usize,
) -> Vec<Line> {
    snapshot
        .resets
        .iter()
        .map(|(key, at)| {
            let label = match snapshot.metrics.get(key) {
                Some(metric) => classify(key, metric, display).label,
                None => prettify_key(key),
            };
            let when = if *at > ctx.now {
                format!("in {}", format::duration(*at - ctx.now))
            } else {
                "due".to_string()
            };
            label_value(
                &format!("↻ {}", label),
                Span::styled(when, Style::fg(Color::Cyan)),
                width,
            )
        })
        .collect()
}
