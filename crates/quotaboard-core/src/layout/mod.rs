//! Tile grid search and per-tile content budgeting.

mod sections;

pub use sections::{fit_sections, SectionKind, TileSection};

/// Columns between adjacent tiles
pub const GAP: usize = 1;
/// Columns taken by a tile's left and right border
pub const BORDER_WIDTH: usize = 2;
/// Rows taken by a tile's top and bottom border
pub const BORDER_HEIGHT: usize = 2;
/// Narrowest inner tile width in any layout
pub const MIN_TILE_WIDTH: usize = 26;
/// Narrowest inner tile width once tiles sit side by side
pub const MIN_MULTI_COLUMN_WIDTH: usize = 34;
/// Lowest inner tile height in a multi-column grid
pub const MIN_TILE_HEIGHT: usize = 7;
/// Identity and status lines at the top of every tile
pub const HEADER_LINES: usize = 2;
/// Last-updated line at the bottom of every tile
pub const FOOTER_LINES: usize = 1;
pub const DEFAULT_MAX_COLUMNS: usize = 3;

/// Grid placement of equally sized tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    /// Inner width of each tile (between the borders)
    pub tile_width: usize,
    /// Outer height of each tile (borders included)
    pub tile_height: usize,
    /// Lines left for content sections after borders, header and footer
    pub body_height: usize,
}

impl GridLayout {
    /// Choose a grid for `item_count` tiles inside `content_width` x `content_height`.
    ///
    /// Column counts from `min(max_columns, item_count)` down to 2 are tried.
    /// A candidate passes when its tiles meet the minimum inner width and
    /// height; among passing candidates the one leaving the fewest empty cells
    /// wins, more columns breaking ties. Nothing passing means one column at
    /// full width, which may be taller than the content area and scroll.
    pub fn compute(
        content_width: usize,
        content_height: usize,
        item_count: usize,
        max_columns: usize,
    ) -> Self {
        if item_count == 0 {
            return Self::from_parts(1, 0, content_width.saturating_sub(BORDER_WIDTH), 0);
        }

        let mut best: Option<(usize, Self)> = None;
        for columns in (2..=max_columns.min(item_count)).rev() {
            let Some(candidate) =
                Self::candidate(content_width, content_height, item_count, columns)
            else {
                continue;
            };
            let empty = candidate.rows * columns - item_count;
            // Strict comparison keeps the earlier, wider candidate on ties
            if best.as_ref().is_none_or(|(best_empty, _)| empty < *best_empty) {
                best = Some((empty, candidate));
            }
        }

        if let Some((_, layout)) = best {
            return layout;
        }

        if item_count > 1 {
            tracing::debug!(
                content_width,
                content_height,
                item_count,
                "no multi-column grid fits, using a single column"
            );
        }
        let tile_height = (content_height / item_count)
            .max(MIN_TILE_HEIGHT + BORDER_HEIGHT)
            .min(content_height);
        Self::from_parts(
            1,
            item_count,
            content_width.saturating_sub(BORDER_WIDTH),
            tile_height,
        )
    }

    fn candidate(
        content_width: usize,
        content_height: usize,
        item_count: usize,
        columns: usize,
    ) -> Option<Self> {
        let usable = content_width.checked_sub((columns - 1) * GAP)?;
        let tile_width = (usable / columns).checked_sub(BORDER_WIDTH)?;
        if tile_width < MIN_TILE_WIDTH || tile_width < MIN_MULTI_COLUMN_WIDTH {
            return None;
        }

        let rows = item_count.div_ceil(columns);
        let tile_height = content_height / rows;
        if tile_height.checked_sub(BORDER_HEIGHT)? < MIN_TILE_HEIGHT {
            return None;
        }

        Some(Self::from_parts(columns, rows, tile_width, tile_height))
    }

    fn from_parts(columns: usize, rows: usize, tile_width: usize, tile_height: usize) -> Self {
        Self {
            columns,
            rows,
            tile_width,
            tile_height,
            body_height: tile_height.saturating_sub(BORDER_HEIGHT + HEADER_LINES + FOOTER_LINES),
        }
    }

    /// Outer width of each tile
    pub fn outer_width(&self) -> usize {
        self.tile_width + BORDER_WIDTH
    }

    /// Lines the whole grid occupies
    pub fn total_height(&self) -> usize {
        self.rows * self.tile_height
    }

    /// Row and column of the tile at `index`
    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }

    pub fn empty_cells(&self, item_count: usize) -> usize {
        (self.rows * self.columns).saturating_sub(item_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_eight_tiles_prefer_balanced_grid() {
        let layout = GridLayout::compute(200, 50, 8, DEFAULT_MAX_COLUMNS);
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.rows, 4);
        assert_eq!(layout.empty_cells(8), 0);
        assert_eq!(layout.tile_height, 12);
        assert_eq!(layout.tile_width, 97);
        assert_eq!(layout.body_height, 7);
    }

    #[test]
    fn test_ties_prefer_more_columns() {
        // 6 tiles: 3x2 and 2x3 both fill every cell
        let layout = GridLayout::compute(200, 60, 6, DEFAULT_MAX_COLUMNS);
        assert_eq!((layout.columns, layout.rows), (3, 2));
    }

    #[test]
    fn test_chosen_grid_has_fewest_empty_cells() {
        for n in 2..=12 {
            let layout = GridLayout::compute(240, 120, n, 4);
            assert!(layout.columns >= 2, "n={n} fell back");
            for columns in 2..=4.min(n) {
                let rows = n.div_ceil(columns);
                let empty = rows * columns - n;
                assert!(
                    layout.empty_cells(n) <= empty,
                    "n={n}: {} columns beat {}",
                    columns,
                    layout.columns
                );
            }
        }
    }

    #[test]
    fn test_narrow_terminal_falls_back_to_single_column() {
        let layout = GridLayout::compute(60, 40, 5, DEFAULT_MAX_COLUMNS);
        assert_eq!(layout.columns, 1);
        assert_eq!(layout.rows, 5);
        assert_eq!(layout.tile_width, 58);
        assert_eq!(layout.tile_height, 9);
        assert_eq!(layout.total_height(), 45);
    }

    #[test]
    fn test_short_terminal_falls_back_and_caps_height() {
        let layout = GridLayout::compute(200, 6, 4, DEFAULT_MAX_COLUMNS);
        assert_eq!(layout.columns, 1);
        assert_eq!(layout.tile_height, 6);
        assert_eq!(layout.body_height, 1);
    }

    #[test]
    fn test_single_item_uses_full_area() {
        let layout = GridLayout::compute(80, 24, 1, DEFAULT_MAX_COLUMNS);
        assert_eq!((layout.columns, layout.rows), (1, 1));
        assert_eq!(layout.tile_height, 24);
        assert_eq!(layout.outer_width(), 80);
    }

    #[test]
    fn test_no_items() {
        let layout = GridLayout::compute(80, 24, 0, DEFAULT_MAX_COLUMNS);
        assert_eq!(layout.rows, 0);
        assert_eq!(layout.total_height(), 0);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let first = GridLayout::compute(173, 41, 7, 4);
        for _ in 0..10 {
            assert_eq!(GridLayout::compute(173, 41, 7, 4), first);
        }
    }

    #[test]
    fn test_cell() {
        let layout = GridLayout::compute(200, 50, 8, DEFAULT_MAX_COLUMNS);
        assert_eq!(layout.cell(0), (0, 0));
        assert_eq!(layout.cell(5), (2, 1));
    }
}
