//! Linear cost report: providers, model totals and budgets.

use std::cmp::Ordering;

use super::{label_value, RenderContext};
use crate::aggregate::{sort_providers, CostData};
use crate::format;
use crate::paint::{Color, Line, Span, Style};
use crate::status::{budget_tone, status_tone};

const COST_WIDTH: usize = 11;
const TOKENS_WIDTH: usize = 9;
const RATE_WIDTH: usize = 10;

/// Every line of the report, unwindowed
pub(super) fn report(data: &CostData, ctx: &RenderContext) -> Vec<Line> {
    let width = ctx.width;
    let mut lines = Vec::new();

    lines.push(section_title(
        &format!("Providers · sorted by {}", ctx.sort.display_name()),
        width,
    ));
    lines.push(columns(
        "  Account",
        &["Cost", "Tokens", "Burn/h"],
        width,
    ));
    let mut providers = data.providers.clone();
    sort_providers(&mut providers, ctx.sort);
    if providers.is_empty() {
        lines.push(Line::styled("  No accounts", Style::fg(Color::DarkGray)));
    }
    for entry in &providers {
        let name = Line::styled(
            format!("{} ", entry.status.indicator()),
            status_tone(entry.status).style(),
        )
        .with(Span::styled(entry.name.clone(), Style::fg(entry.color)));
        lines.push(columns_line(
            name,
            &[
                format::money(entry.cost, "USD"),
                format::compact_number(entry.total_tokens()),
                rate(entry.burn_rate),
            ],
            width,
        ));
    }
    lines.push(columns_line(
        Line::styled("  Total", Style::default().bold()),
        &[
            format::money(data.total_cost, "USD"),
            format::compact_number(data.total_tokens()),
            rate(data.burn_rate),
        ],
        width,
    ));
    lines.push(Line::new());

    lines.push(section_title("Models", width));
    lines.push(columns(
        "  Model",
        &["Input", "Output", "Cost"],
        width,
    ));
    let mut models = data.model_totals();
    models.sort_by(|a, b| {
        b.total_tokens()
            .partial_cmp(&a.total_tokens())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    if models.is_empty() {
        lines.push(Line::styled("  No model usage", Style::fg(Color::DarkGray)));
    }
    for model in &models {
        lines.push(columns_line(
            Line::raw(format!("  {}", model.name)),
            &[
                format::compact_number(model.input_tokens),
                format::compact_number(model.output_tokens),
                model
                    .cost
                    .map(|c| format::money(c, "USD"))
                    .unwrap_or_else(|| format::UNAVAILABLE.to_string()),
            ],
            width,
        ));
    }
    lines.push(Line::new());

    lines.push(section_title("Budgets", width));
    if data.budgets.is_empty() {
        lines.push(Line::styled("  No budgets reported", Style::fg(Color::DarkGray)));
    }
    let mut budgets = data.budgets.clone();
    budgets.sort_by(|a, b| {
        b.percent
            .partial_cmp(&a.percent)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    for budget in &budgets {
        let tone = budget_tone(budget.percent);
        lines.push(label_value(
            &format!("  {}", budget.name),
            Span::styled(
                format!(
                    "{} / {} ({})",
                    format::money(budget.used, &budget.unit),
                    format::money(budget.limit, &budget.unit),
                    format::percent(Some(budget.percent))
                ),
                tone.style(),
            ),
            width,
        ));

        let bar_width = (width / 3).clamp(10, 40);
        let (filled, empty) = format::bar(budget.percent / 100.0, bar_width);
        let projection = budget.projection(ctx.now);
        let outlook = if budget.used >= budget.limit {
            "over limit".to_string()
        } else if projection.exceeds_limit {
            match projection.hours_to_limit {
                Some(h) => format!("limit in {}", format::duration(hours(h))),
                None => "projected over limit".to_string(),
            }
        } else if let Some(projected) = projection.projected_used {
            format!("≈ {} by reset", format::money(projected, &budget.unit))
        } else if let Some(h) = projection.hours_to_limit {
            format!("limit in {}", format::duration(hours(h)))
        } else {
            "no burn".to_string()
        };
        lines.push(
            Line::raw("    ")
                .with(Span::styled(filled, tone.style()))
                .with(Span::styled(empty, Style::fg(Color::DarkGray)))
                .with(Span::raw(" "))
                .with(Span::styled(
                    outlook,
                    if projection.exceeds_limit {
                        tone.style().bold()
                    } else {
                        Style::default().dim()
                    },
                )),
        );
    }

    lines
}

fn hours(h: f64) -> chrono::Duration {
    chrono::Duration::seconds((h * 3600.0).round() as i64)
}

fn rate(burn_rate: f64) -> String {
    if burn_rate > 0.0 {
        format::money(burn_rate, "USD")
    } else {
        "-".to_string()
    }
}

fn section_title(title: &str, width: usize) -> Line {
    let head = Line::styled(format!("─ {} ", title), Style::default().bold());
    let rule = width.saturating_sub(head.width());
    head.with(Span::styled("─".repeat(rule), Style::fg(Color::DarkGray)))
}

/// Dimmed column headings
fn columns(head: &str, titles: &[&str], width: usize) -> Line {
    let cells: Vec<String> = titles.iter().map(|t| t.to_string()).collect();
    let mut line = columns_line(Line::raw(head), &cells, width);
    for span in &mut line.spans {
        span.style = Style::default().dim();
    }
    line
}

/// Name column filling the remaining width, then right-aligned value cells
fn columns_line(name: Line, cells: &[String], width: usize) -> Line {
    let widths = [COST_WIDTH, TOKENS_WIDTH, RATE_WIDTH];
    let fixed: usize = widths.iter().take(cells.len()).sum();
    let mut line = name.fit(width.saturating_sub(fixed));
    for (cell, w) in cells.iter().zip(widths) {
        line.push(Span::raw(format::pad_left(&format::truncate(cell, w - 1), w)));
    }
    line
}
