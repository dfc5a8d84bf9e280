//! Priority-ordered tile body sections and the line budget that packs them.

use crate::paint::Line;

/// Kinds of tile body content, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Gauges,
    Headline,
    Composition,
    Metrics,
    Message,
    Metadata,
    Resets,
}

/// A block of lines of one kind
#[derive(Debug, Clone, PartialEq)]
pub struct TileSection {
    pub kind: SectionKind,
    pub lines: Vec<Line>,
}

impl TileSection {
    pub fn new(kind: SectionKind, lines: Vec<Line>) -> Self {
        Self { kind, lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Pack sections into exactly `budget` lines.
///
/// Sections are taken in priority order. Each one is appended whole while it
/// fits; the first that does not is cut to the remaining lines and everything
/// after it is dropped. Leftover lines are blank.
pub fn fit_sections(mut sections: Vec<TileSection>, budget: usize) -> Vec<Line> {
    sections.sort_by_key(|s| s.kind);

    let mut out: Vec<Line> = Vec::with_capacity(budget);
    for section in sections.into_iter().filter(|s| !s.is_empty()) {
        let room = budget - out.len();
        if room == 0 {
            break;
        }
        if section.len() <= room {
            out.extend(section.lines);
        } else {
            tracing::trace!(kind = ?section.kind, room, "section truncated");
            out.extend(section.lines.into_iter().take(room));
            break;
        }
    }

    out.resize_with(budget, Line::new);
    out
}
