//! Scroll windowing over a block of lines.
//!
//! A [`Viewport`] is recomputed from scratch on every render; it keeps no
//! state between calls, so the same inputs always give the same window.

use crate::paint::{Line, Style};

/// A window of `visible` lines starting at `offset` into `total` lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub offset: usize,
    pub total: usize,
    pub visible: usize,
}

impl Viewport {
    /// Window at a raw offset, clamped so the window never runs past the end
    pub fn at(total: usize, visible: usize, offset: usize) -> Self {
        Self {
            offset: offset.min(total.saturating_sub(visible)),
            total,
            visible,
        }
    }

    /// Window that keeps the span `span_start..span_start + span_len` in view.
    ///
    /// The span is kept clear of both indicator lines whenever it is at most
    /// `visible - 2` lines tall. Taller spans show their top edge.
    pub fn follow(total: usize, visible: usize, span_start: usize, span_len: usize) -> Self {
        if total <= visible {
            return Self::at(total, visible, 0);
        }

        let max_offset = total - visible;
        let span_end = span_start + span_len.max(1) - 1;

        // Smallest offset that keeps the span's last line above the bottom indicator
        let mut offset = (span_end + 2).saturating_sub(visible).min(max_offset);
        if offset > 0 && span_start <= offset {
            offset = span_start.saturating_sub(1);
        }

        Self::at(total, visible, offset)
    }

    pub fn hidden_above(&self) -> usize {
        self.offset
    }

    pub fn hidden_below(&self) -> usize {
        self.total.saturating_sub(self.offset + self.visible)
    }

    /// Cut `lines` to the window, replacing the edge lines with "more"
    /// indicators where content is hidden. The result has
    /// `min(visible, lines.len())` lines, each `width` columns wide.
    pub fn window(&self, lines: &[Line], width: usize) -> Vec<Line> {
        let start = self.offset.min(lines.len());
        let end = (self.offset + self.visible).min(lines.len());
        let mut out: Vec<Line> = lines[start..end].iter().map(|l| l.fit(width)).collect();

        if self.hidden_above() > 0 {
            if let Some(first) = out.first_mut() {
                // The replaced line is hidden too
                *first = indicator('▲', self.hidden_above() + 1, width);
            }
        }
        if self.hidden_below() > 0 {
            if let Some(last) = out.last_mut() {
                *last = indicator('▼', self.hidden_below() + 1, width);
            }
        }
        out
    }
}

fn indicator(arrow: char, count: usize, width: usize) -> Line {
    Line::styled(format!(" {arrow} {count} more"), Style::default().dim()).fit(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(n: usize) -> Vec<Line> {
        (0..n).map(|i| Line::raw(format!("line {i}"))).collect()
    }

    #[test]
    fn test_everything_fits() {
        let vp = Viewport::follow(5, 10, 4, 1);
        assert_eq!(vp.offset, 0);
        assert_eq!(vp.hidden_above(), 0);
        assert_eq!(vp.hidden_below(), 0);
        let out = vp.window(&lines(5), 10);
        assert_eq!(out.len(), 5);
        assert_eq!(out[4].plain(), "line 4    ");
    }

    #[test]
    fn test_follow_cursor_near_top() {
        let vp = Viewport::follow(100, 10, 3, 1);
        assert_eq!(vp.offset, 0);
        assert_eq!(vp.hidden_below(), 90);
    }

    #[test]
    fn test_follow_keeps_span_off_indicators() {
        let total = 60;
        let visible = 20;
        let tile = 9;
        for row in 0..(total / tile) {
            let start = row * tile;
            let vp = Viewport::follow(total, visible, start, tile);
            let top_clear = if vp.hidden_above() > 0 { vp.offset + 1 } else { vp.offset };
            let bottom_clear = if vp.hidden_below() > 0 {
                vp.offset + visible - 2
            } else {
                vp.offset + visible - 1
            };
            assert!(start >= top_clear, "row {row}: {vp:?}");
            assert!(start + tile - 1 <= bottom_clear, "row {row}: {vp:?}");
        }
    }

    #[test]
    fn test_follow_last_span_scrolls_to_end() {
        let vp = Viewport::follow(50, 10, 45, 5);
        assert_eq!(vp.offset, 40);
        assert_eq!(vp.hidden_below(), 0);
    }

    #[test]
    fn test_follow_span_taller_than_window_shows_top_edge() {
        // Tiles as tall as the window: the span's first line sits just
        // under the top indicator and the bottom is cut off
        let vp = Viewport::follow(80, 20, 40, 20);
        assert_eq!(vp.offset, 39);
        assert_eq!(vp.hidden_above(), 39);
        assert!(vp.hidden_below() > 0);

        let vp = Viewport::follow(80, 20, 0, 30);
        assert_eq!(vp.offset, 0);

        let window = Viewport::follow(80, 20, 40, 20).window(&lines(80), 12);
        assert_eq!(window[0].plain().trim(), "▲ 40 more");
        assert_eq!(window[1].plain().trim(), "line 40");
        assert_eq!(window[19].plain().trim(), "▼ 22 more");
    }

    #[test]
    fn test_follow_is_idempotent() {
        for cursor in 0..40 {
            let a = Viewport::follow(40, 12, cursor, 1);
            let b = Viewport::follow(40, 12, cursor, 1);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_at_clamps_offset() {
        assert_eq!(Viewport::at(30, 10, 500).offset, 20);
        assert_eq!(Viewport::at(5, 10, 3).offset, 0);
    }

    #[test]
    fn test_window_indicators() {
        let vp = Viewport::at(20, 5, 7);
        let out = vp.window(&lines(20), 12);
        let texts: Vec<String> = out.iter().map(Line::plain).collect();
        assert_eq!(
            texts,
            vec![
                " ▲ 8 more   ",
                "line 8      ",
                "line 9      ",
                "line 10     ",
                " ▼ 9 more   ",
            ]
        );
    }

    #[test]
    fn test_window_single_indicator_at_end() {
        let vp = Viewport::at(8, 4, 10);
        let out = vp.window(&lines(8), 8);
        assert_eq!(out[0].plain(), " ▲ 5 mo…");
        assert_eq!(out[3].plain(), "line 7  ");
    }
}
