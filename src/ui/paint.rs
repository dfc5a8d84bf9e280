//! Terminal painting for the core's styled lines.

use ansi_to_tui::IntoText;
use anyhow::{anyhow, Result};
use ratatui::text::Text;

use quotaboard_core::{Color, Paint, Style};

/// Painter that wraps each styled span in SGR escape sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiPaint;

impl AnsiPaint {
    fn color_code(color: Color, background: bool) -> String {
        let base = match color {
            Color::Black => 30,
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Magenta => 35,
            Color::Cyan => 36,
            Color::Gray => 37,
            Color::DarkGray => 90,
            Color::White => 97,
            Color::Rgb(r, g, b) => {
                let mode = if background { 48 } else { 38 };
                return format!("{};2;{};{};{}", mode, r, g, b);
            }
        };
        (if background { base + 10 } else { base }).to_string()
    }
}

impl Paint for AnsiPaint {
    fn paint(&self, text: &str, style: Style) -> String {
        let mut codes: Vec<String> = Vec::new();
        if style.bold {
            codes.push("1".to_string());
        }
        if style.dim {
            codes.push("2".to_string());
        }
        if let Some(fg) = style.fg {
            codes.push(Self::color_code(fg, false));
        }
        if let Some(bg) = style.bg {
            codes.push(Self::color_code(bg, true));
        }
        if codes.is_empty() {
            return text.to_string();
        }
        format!("\x1b[{}m{}\x1b[0m", codes.join(";"), text)
    }
}

/// Decode painted output into ratatui text
pub fn to_text(painted: &str) -> Result<Text<'static>> {
    painted
        .as_bytes()
        .into_text()
        .map_err(|e| anyhow!("Failed to decode dashboard output: {:?}", e))
}
