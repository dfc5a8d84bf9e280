//! Whole-screen composition.
//!
//! A [`Dashboard`] turns the current snapshot set into exactly `height`
//! lines of exactly `width` columns: one title line, then either the tile
//! grid or the analytics report windowed through a [`Viewport`].

mod analytics;
mod tile;

use chrono::{DateTime, Utc};

use crate::aggregate::{extract_cost_data, CostData, CostSort};
use crate::format;
use crate::layout::{GridLayout, DEFAULT_MAX_COLUMNS, GAP};
use crate::overrides::OverrideRegistry;
use crate::paint::{Color, Line, Paint, Span, Style};
use crate::snapshot::{Snapshot, SnapshotSet};
use crate::viewport::Viewport;

/// Lines above the content area
const TITLE_LINES: usize = 1;

/// What the content area shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardView {
    #[default]
    Tiles,
    Analytics,
}

impl DashboardView {
    pub fn next(self) -> Self {
        match self {
            DashboardView::Tiles => DashboardView::Analytics,
            DashboardView::Analytics => DashboardView::Tiles,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DashboardView::Tiles => "Tiles",
            DashboardView::Analytics => "Analytics",
        }
    }
}

/// Per-render inputs besides the snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    /// Clock used for ages, reset countdowns and projections
    pub now: DateTime<Utc>,
    pub width: usize,
    pub height: usize,
    pub view: DashboardView,
    /// Selected tile index in the tile view
    pub cursor: usize,
    /// Raw line offset into the analytics report
    pub scroll: usize,
    /// Case-insensitive account/provider substring; empty shows everything
    pub filter: String,
    pub sort: CostSort,
    pub max_columns: usize,
}

impl RenderContext {
    pub fn new(now: DateTime<Utc>, width: usize, height: usize) -> Self {
        Self {
            now,
            width,
            height,
            view: DashboardView::default(),
            cursor: 0,
            scroll: 0,
            filter: String::new(),
            sort: CostSort::default(),
            max_columns: DEFAULT_MAX_COLUMNS,
        }
    }

    pub fn with_view(mut self, view: DashboardView) -> Self {
        self.view = view;
        self
    }

    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_sort(mut self, sort: CostSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = max_columns.max(1);
        self
    }

    fn content_height(&self) -> usize {
        self.height.saturating_sub(TITLE_LINES)
    }
}

/// Renders snapshot sets using one display override registry
#[derive(Debug, Clone, Copy)]
pub struct Dashboard<'a> {
    registry: &'a OverrideRegistry,
}

impl<'a> Dashboard<'a> {
    pub fn new(registry: &'a OverrideRegistry) -> Self {
        Self { registry }
    }

    /// Accounts passing `filter`, in tile order (provider name, then account)
    pub fn accounts<'s>(&self, snapshots: &'s SnapshotSet, filter: &str) -> Vec<&'s Snapshot> {
        let mut accounts: Vec<&Snapshot> = snapshots
            .values()
            .filter(|s| s.matches_filter(filter))
            .collect();
        accounts.sort_by_cached_key(|s| {
            (
                self.registry.provider_name(&s.provider_id).to_lowercase(),
                s.display_name().to_lowercase(),
                s.account_id.clone(),
            )
        });
        accounts
    }

    /// Grid the tile view uses for the current inputs
    pub fn grid(&self, snapshots: &SnapshotSet, ctx: &RenderContext) -> GridLayout {
        let count = self.accounts(snapshots, &ctx.filter).len();
        GridLayout::compute(ctx.width, ctx.content_height(), count, ctx.max_columns)
    }

    /// Number of lines in the analytics report, for scroll clamping
    pub fn analytics_len(&self, snapshots: &SnapshotSet, ctx: &RenderContext) -> usize {
        let accounts = self.accounts(snapshots, &ctx.filter);
        analytics::report(&extract_cost_data(accounts, ""), ctx).len()
    }

    /// Largest useful analytics scroll offset
    pub fn max_scroll(&self, snapshots: &SnapshotSet, ctx: &RenderContext) -> usize {
        self.analytics_len(snapshots, ctx)
            .saturating_sub(ctx.content_height())
    }

    /// The styled block: exactly `ctx.height` lines of `ctx.width` columns
    pub fn lines(&self, snapshots: &SnapshotSet, ctx: &RenderContext) -> Vec<Line> {
        if ctx.height == 0 {
            return Vec::new();
        }

        let accounts = self.accounts(snapshots, &ctx.filter);
        let data = extract_cost_data(accounts.iter().copied(), "");
        let content_height = ctx.content_height();

        let mut out = vec![title(&data, ctx).fit(ctx.width)];
        match ctx.view {
            DashboardView::Tiles => out.extend(self.tile_grid(&accounts, ctx, content_height)),
            DashboardView::Analytics => {
                let report = analytics::report(&data, ctx);
                let viewport = Viewport::at(report.len(), content_height, ctx.scroll);
                out.extend(viewport.window(&report, ctx.width));
            }
        }
        out.resize_with(ctx.height, || blank(ctx.width));
        out
    }

    /// Paint the block and join it with newlines
    pub fn render(
        &self,
        snapshots: &SnapshotSet,
        ctx: &RenderContext,
        paint: &dyn Paint,
    ) -> String {
        self.lines(snapshots, ctx)
            .iter()
            .map(|line| line.render(paint))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn tile_grid(
        &self,
        accounts: &[&Snapshot],
        ctx: &RenderContext,
        content_height: usize,
    ) -> Vec<Line> {
        if accounts.is_empty() {
            let notice = if ctx.filter.is_empty() {
                "No accounts reported yet".to_string()
            } else {
                format!("No accounts match \"{}\"", ctx.filter)
            };
            return vec![Line::styled(format!("  {}", notice), Style::fg(Color::DarkGray))
                .fit(ctx.width)];
        }

        let layout =
            GridLayout::compute(ctx.width, content_height, accounts.len(), ctx.max_columns);
        let cursor = ctx.cursor.min(accounts.len() - 1);
        let tiles: Vec<Vec<Line>> = accounts
            .iter()
            .enumerate()
            .map(|(i, s)| tile::build(s, self.registry, ctx, &layout, i == cursor))
            .collect();

        let mut grid = Vec::with_capacity(layout.total_height());
        for row in tiles.chunks(layout.columns) {
            for index in 0..layout.tile_height {
                let mut line = Line::new();
                for (column, tile) in row.iter().enumerate() {
                    if column > 0 {
                        line.push(Span::raw(" ".repeat(GAP)));
                    }
                    line.spans.extend(tile[index].spans.iter().cloned());
                }
                grid.push(line);
            }
        }

        let (row, _) = layout.cell(cursor);
        Viewport::follow(
            grid.len(),
            content_height,
            row * layout.tile_height,
            layout.tile_height,
        )
        .window(&grid, ctx.width)
    }
}

fn title(data: &CostData, ctx: &RenderContext) -> Line {
    let sep = || Span::styled(" │ ", Style::fg(Color::DarkGray));
    let mut line = Line::styled(" quotaboard", Style::fg(Color::Cyan).bold())
        .with(sep())
        .with(Span::raw(ctx.view.display_name()))
        .with(sep())
        .with(Span::raw(format!(
            "{}/{} active",
            data.active_providers, data.total_providers
        )))
        .with(sep())
        .with(Span::styled(
            format::money(data.total_cost, "USD"),
            Style::default().bold(),
        ))
        .with(sep())
        .with(Span::raw(format!(
            "{} tok",
            format::compact_number(data.total_tokens())
        )));
    if data.burn_rate > 0.0 {
        line.push(sep());
        line.push(Span::styled(
            format!("{}/h", format::money(data.burn_rate, "USD")),
            Style::fg(Color::Yellow),
        ));
    }
    if ctx.view == DashboardView::Analytics {
        line.push(sep());
        line.push(Span::raw(format!("sort {}", ctx.sort.display_name())));
    }
    if !ctx.filter.is_empty() {
        line.push(sep());
        line.push(Span::styled(
            format!("filter \"{}\"", ctx.filter),
            Style::fg(Color::Magenta),
        ));
    }
    line
}

pub(crate) fn blank(width: usize) -> Line {
    Line::raw(" ".repeat(width))
}

/// Label on the left, value on the right, exactly `width` columns
pub(crate) fn label_value(label: &str, value: Span, width: usize) -> Line {
    let label_width = width.saturating_sub(value.width() + 1);
    Line::raw(format::fit(label, label_width))
        .with(Span::raw(" "))
        .with(value)
        .fit(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::PlainPaint;
    use crate::snapshot::{Metric, Status};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use unicode_width::UnicodeWidthStr;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn two_dialects() -> SnapshotSet {
        let openai = Snapshot::new("openai", "work")
            .with_status(Status::Ok)
            .with_timestamp(now() - chrono::Duration::minutes(5))
            .with_metric("model_gpt4_cost_usd", Metric::from_used(50.0))
            .with_metric("model_gpt4_input_tokens", Metric::from_used(1000.0))
            .with_metric("model_gpt4_output_tokens", Metric::from_used(500.0))
            .with_metric(
                "rate_limit_requests",
                Metric::from_used(30.0).with_limit(100.0),
            );
        let anthropic = Snapshot::new("anthropic", "team")
            .with_status(Status::Ok)
            .with_timestamp(now())
            .with_metric("input_tokens_claude", Metric::from_used(2000.0))
            .with_metric("output_tokens_claude", Metric::from_used(800.0));
        SnapshotSet::from([
            ("work".to_string(), openai),
            ("team".to_string(), anthropic),
        ])
    }

    fn many(n: usize) -> SnapshotSet {
        (0..n)
            .map(|i| {
                let id = format!("acct{:02}", i);
                let snap = Snapshot::new("openai", id.clone())
                    .with_status(Status::Ok)
                    .with_metric("requests", Metric::from_used(i as f64));
                (id, snap)
            })
            .collect()
    }

    fn assert_block(out: &str, width: usize, height: usize) {
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), height);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line.width(), width, "line {i}: {line:?}");
        }
    }

    #[test]
    fn test_block_has_exact_dimensions() {
        let registry = OverrideRegistry::builtin();
        let dashboard = Dashboard::new(&registry);
        for (width, height) in [(200, 51), (120, 40), (80, 24), (40, 10), (10, 3)] {
            for view in [DashboardView::Tiles, DashboardView::Analytics] {
                let ctx = RenderContext::new(now(), width, height).with_view(view);
                let out = dashboard.render(&two_dialects(), &ctx, &PlainPaint);
                assert_block(&out, width, height);
            }
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let registry = OverrideRegistry::builtin();
        let dashboard = Dashboard::new(&registry);
        let ctx = RenderContext::new(now(), 120, 40);
        let first = dashboard.render(&two_dialects(), &ctx, &PlainPaint);
        for _ in 0..3 {
            assert_eq!(dashboard.render(&two_dialects(), &ctx, &PlainPaint), first);
        }
    }

    #[test]
    fn test_title_totals() {
        let registry = OverrideRegistry::builtin();
        let dashboard = Dashboard::new(&registry);
        let ctx = RenderContext::new(now(), 120, 30);
        let lines = dashboard.lines(&two_dialects(), &ctx);
        let title = lines[0].plain();
        assert!(title.contains("2/2 active"), "{title}");
        assert!(title.contains("$50.00"), "{title}");
        assert!(title.contains("4.3k tok"), "{title}");
    }

    #[test]
    fn test_tiles_show_each_account() {
        let registry = OverrideRegistry::builtin();
        let dashboard = Dashboard::new(&registry);
        let ctx = RenderContext::new(now(), 120, 30);
        let out = dashboard.render(&two_dialects(), &ctx, &PlainPaint);
        assert!(out.contains("work"));
        assert!(out.contains("team"));
        assert!(out.contains("updated 5m ago"));
        assert!(out.contains("Models by tokens"));
        // The rate limit is drawn as a gauge, not repeated as a metric row
        assert!(out.contains("70%"));
        assert!(!out.contains("30 / 100"));
    }

    #[test]
    fn test_eight_tiles_use_two_columns() {
        let registry = OverrideRegistry::builtin();
        let dashboard = Dashboard::new(&registry);
        let ctx = RenderContext::new(now(), 200, 51);
        let grid = dashboard.grid(&many(8), &ctx);
        assert_eq!((grid.columns, grid.rows), (2, 4));

        let lines = dashboard.lines(&many(8), &ctx);
        // Two tile borders side by side on the first grid line
        assert_eq!(lines[1].plain().matches('╭').count(), 2);
    }

    #[test]
    fn test_cursor_scrolls_single_column() {
        let registry = OverrideRegistry::builtin();
        let dashboard = Dashboard::new(&registry);
        let ctx = RenderContext::new(now(), 60, 25).with_cursor(7);
        let out = dashboard.render(&many(8), &ctx, &PlainPaint);
        assert_block(&out, 60, 25);
        assert!(out.contains("▸ OpenAI · acct07"), "{out}");
        assert!(out.contains("▲"));
        assert!(!out.contains("acct00"));
    }

    #[test]
    fn test_cursor_is_clamped() {
        let registry = OverrideRegistry::builtin();
        let dashboard = Dashboard::new(&registry);
        let a = dashboard.render(
            &many(3),
            &RenderContext::new(now(), 60, 25).with_cursor(99),
            &PlainPaint,
        );
        let b = dashboard.render(
            &many(3),
            &RenderContext::new(now(), 60, 25).with_cursor(2),
            &PlainPaint,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_filter_without_matches() {
        let registry = OverrideRegistry::builtin();
        let dashboard = Dashboard::new(&registry);
        let ctx = RenderContext::new(now(), 80, 10).with_filter("nothing");
        let out = dashboard.render(&two_dialects(), &ctx, &PlainPaint);
        assert!(out.contains("No accounts match \"nothing\""));
        assert_block(&out, 80, 10);
    }

    #[test]
    fn test_analytics_report_and_scroll() {
        let registry = OverrideRegistry::builtin();
        let dashboard = Dashboard::new(&registry);
        let ctx = RenderContext::new(now(), 100, 40).with_view(DashboardView::Analytics);
        let out = dashboard.render(&two_dialects(), &ctx, &PlainPaint);
        assert!(out.contains("Providers · sorted by Cost"));
        assert!(out.contains("gpt4"));
        assert!(out.contains("claude"));
        assert!(out.contains("No budgets reported"));

        let len = dashboard.analytics_len(&two_dialects(), &ctx);
        let short = RenderContext::new(now(), 100, 6)
            .with_view(DashboardView::Analytics)
            .with_scroll(len * 2);
        let lines = dashboard.lines(&two_dialects(), &short);
        assert_eq!(lines.len(), 6);
        assert!(lines[1].plain().contains("▲"));
        assert!(!lines[5].plain().contains("▼"));
        assert_eq!(dashboard.max_scroll(&two_dialects(), &short), len - 5);
        assert_eq!(dashboard.max_scroll(&two_dialects(), &ctx), 0);
    }

    #[test]
    fn test_label_value_width() {
        let line = label_value("A very long label indeed", Span::raw("$12.00"), 20);
        assert_eq!(line.width(), 20);
        assert!(line.plain().ends_with("$12.00"));
    }
}
