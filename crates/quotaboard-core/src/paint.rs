//! Paint capability and styled text lines.
//!
//! The core never emits terminal escape codes itself. Every line is built from
//! plain-text spans whose print width is measured before styling, and only the
//! final step hands each span to a [`Paint`] implementation. A painter must
//! return a string that prints at exactly the width of its input.

use unicode_width::UnicodeWidthStr;

use crate::format;

/// Terminal colors understood by painters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    DarkGray,
    White,
    Rgb(u8, u8, u8),
}

/// Text style attached to a span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

impl Style {
    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::default()
        }
    }

    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Turns a plain string and a style into display-ready text
pub trait Paint {
    fn paint(&self, text: &str, style: Style) -> String;
}

/// Painter that drops all styling
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPaint;

impl Paint for PlainPaint {
    fn paint(&self, text: &str, _style: Style) -> String {
        text.to_string()
    }
}

/// A run of text with one style
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn width(&self) -> usize {
        self.text.width()
    }
}

/// A single terminal line made of styled spans
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            spans: vec![Span::raw(text)],
        }
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            spans: vec![Span::styled(text, style)],
        }
    }

    pub fn push(&mut self, span: Span) {
        if !span.text.is_empty() {
            self.spans.push(span);
        }
    }

    pub fn with(mut self, span: Span) -> Self {
        self.push(span);
        self
    }

    /// Print width of the whole line
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    pub fn is_blank(&self) -> bool {
        self.spans.iter().all(|s| s.text.trim().is_empty())
    }

    /// Unstyled text of the line
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Cut the line to `width`, ending with an ellipsis when anything was dropped
    pub fn truncate(&self, width: usize) -> Line {
        if self.width() <= width {
            return self.clone();
        }
        if width == 0 {
            return Line::new();
        }

        let mut out = Line::new();
        let mut budget = width - 1;
        let mut last_style = Style::default();
        for span in &self.spans {
            last_style = span.style;
            if budget == 0 {
                break;
            }
            let w = span.width();
            if w <= budget {
                out.push(span.clone());
                budget -= w;
            } else {
                out.push(Span::styled(format::take_width(&span.text, budget), span.style));
                budget = 0;
            }
        }
        // Wide glyphs can leave a single unfilled column before the ellipsis
        let filled = out.width();
        if filled < width - 1 {
            out.push(Span::raw(" ".repeat(width - 1 - filled)));
        }
        out.push(Span::styled(format::ELLIPSIS, last_style));
        out
    }

    /// Right-pad the line with spaces up to `width`
    pub fn pad(mut self, width: usize) -> Line {
        let w = self.width();
        if w < width {
            self.push(Span::raw(" ".repeat(width - w)));
        }
        self
    }

    /// Truncate or pad so the line is exactly `width` columns
    pub fn fit(&self, width: usize) -> Line {
        self.truncate(width).pad(width)
    }

    /// Paint every span and join the result
    pub fn render(&self, paint: &dyn Paint) -> String {
        self.spans
            .iter()
            .map(|s| {
                if s.style.is_plain() {
                    s.text.clone()
                } else {
                    paint.paint(&s.text, s.style)
                }
            })
            .collect()
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Line::raw(text)
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Line::raw(text)
    }
}
