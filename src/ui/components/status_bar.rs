use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use quotaboard_core::format;
use quotaboard_core::DashboardView;

use crate::state::AppState;

/// Status bar widget
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState, now: DateTime<Utc>) {
        let line = Self::line(state, now, area.width as usize);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Build the status line: view badge, refresh info, then either the
    /// source error or key hints
    fn line(state: &AppState, now: DateTime<Utc>, width: usize) -> Line<'static> {
        let mut spans = vec![
            Span::styled(
                format!(" {} ", state.view.display_name()),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ),
            Span::raw(" "),
        ];

        let refreshed = match state.last_refresh {
            Some(at) => format!("refreshed {} ", format::age(now, at)),
            None => "waiting for data ".to_string(),
        };
        spans.push(Span::styled(refreshed, Style::default().fg(Color::DarkGray)));

        if let Some(error) = &state.error_message {
            spans.push(Span::styled(
                format!(" {} ", error),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            let hints: &[(&str, &str)] = match state.view {
                DashboardView::Tiles => &[("hjkl", "Move"), ("Tab", "Analytics")],
                DashboardView::Analytics => &[("j/k", "Scroll"), ("s", "Sort"), ("Tab", "Tiles")],
            };
            for (key, label) in hints.iter().chain(&[("?", "Help"), ("q", "Quit")]) {
                spans.push(Span::styled(
                    key.to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(
                    format!(":{} ", label),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }

        // Right-aligned filter badge when there is room
        if !state.filter.is_empty() {
            let badge = format!(" filter: {} ", state.filter);
            let used: usize = spans.iter().map(|s| s.content.width()).sum();
            let badge_width = badge.width();
            if used + badge_width < width {
                spans.push(Span::raw(" ".repeat(width - used - badge_width)));
                spans.push(Span::styled(
                    badge,
                    Style::default().fg(Color::Black).bg(Color::Yellow),
                ));
            }
        }

        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_hints_follow_view() {
        let mut state = AppState::new();
        let now = Utc::now();
        let tiles = text(&StatusBar::line(&state, now, 80));
        assert!(tiles.contains("hjkl:Move"));
        assert!(tiles.contains("waiting for data"));

        state.toggle_view();
        let analytics = text(&StatusBar::line(&state, now, 80));
        assert!(analytics.contains("s:Sort"));
    }

    #[test]
    fn test_error_replaces_hints() {
        let mut state = AppState::new();
        state.set_error("Failed to read snapshot file");
        let line = text(&StatusBar::line(&state, Utc::now(), 80));
        assert!(line.contains("Failed to read snapshot file"));
        assert!(!line.contains("q:Quit"));
    }

    #[test]
    fn test_filter_badge_right_aligned() {
        let mut state = AppState::new();
        state.filter = "work".to_string();
        let line = StatusBar::line(&state, Utc::now(), 100);
        assert!(text(&line).ends_with(" filter: work "));
        assert_eq!(line.width(), 100);
    }
}
