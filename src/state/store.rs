use parking_lot::RwLock;
use std::sync::Arc;

use quotaboard_core::{CostSort, DashboardView, SnapshotSet};

/// Shared state type alias
pub type SharedState = Arc<RwLock<AppState>>;

/// Cursor movement in the tile grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
    First,
    Last,
}

/// Application state
#[derive(Debug)]
pub struct AppState {
    /// Latest complete snapshot set from the source
    pub snapshots: SnapshotSet,
    /// Current view
    pub view: DashboardView,
    /// Selected tile index
    pub cursor: usize,
    /// Analytics scroll offset
    pub scroll: usize,
    /// Current sort for the analytics report
    pub sort: CostSort,
    /// Account/provider filter
    pub filter: String,
    /// Whether help popup is shown
    pub show_help: bool,
    /// Error message to display
    pub error_message: Option<String>,
    /// Time of the last successful refresh
    pub last_refresh: Option<chrono::DateTime<chrono::Utc>>,
    /// Number of refreshes received
    pub refresh_count: u64,
    /// Whether the app is running
    pub running: bool,
}

impl AppState {
    /// Create a new application state
    pub fn new() -> Self {
        Self {
            snapshots: SnapshotSet::new(),
            view: DashboardView::default(),
            cursor: 0,
            scroll: 0,
            sort: CostSort::default(),
            filter: String::new(),
            show_help: false,
            error_message: None,
            last_refresh: None,
            refresh_count: 0,
            running: true,
        }
    }

    /// Create a shared state
    pub fn shared() -> SharedState {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Replace the snapshot set; the previous set is dropped whole
    pub fn update_snapshots(&mut self, snapshots: SnapshotSet) {
        self.snapshots = snapshots;
        self.error_message = None;
        self.last_refresh = Some(chrono::Utc::now());
        self.refresh_count += 1;
    }

    /// Record a source error (the last good snapshot set stays on screen)
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    /// Move the cursor within `count` tiles laid out in `columns` columns
    pub fn move_cursor(&mut self, movement: Move, count: usize, columns: usize) {
        if count == 0 {
            self.cursor = 0;
            return;
        }
        let columns = columns.max(1);
        let last = count - 1;
        let cursor = self.cursor.min(last);

        self.cursor = match movement {
            Move::Left => cursor.saturating_sub(1),
            Move::Right => (cursor + 1).min(last),
            Move::Up => cursor.checked_sub(columns).unwrap_or(cursor),
            Move::Down => {
                let next = cursor + columns;
                if next <= last {
                    next
                } else {
                    cursor
                }
            }
            Move::First => 0,
            Move::Last => last,
        };
    }

    /// Scroll the analytics report by `delta` lines, staying within `max`
    pub fn scroll_by(&mut self, delta: isize, max: usize) {
        let next = self.scroll.saturating_add_signed(delta);
        self.scroll = next.min(max);
    }

    /// Switch between tiles and analytics
    pub fn toggle_view(&mut self) {
        self.view = self.view.next();
        self.scroll = 0;
    }

    /// Cycle the analytics sort
    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Stop the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quotaboard_core::Snapshot;

    #[test]
    fn test_grid_navigation() {
        let mut state = AppState::new();
        // 5 tiles in 2 columns: rows [0 1] [2 3] [4]
        state.move_cursor(Move::Right, 5, 2);
        assert_eq!(state.cursor, 1);
        state.move_cursor(Move::Down, 5, 2);
        assert_eq!(state.cursor, 3);
        state.move_cursor(Move::Down, 5, 2);
        assert_eq!(state.cursor, 3);
        state.move_cursor(Move::Left, 5, 2);
        state.move_cursor(Move::Down, 5, 2);
        assert_eq!(state.cursor, 4);
        state.move_cursor(Move::Up, 5, 2);
        assert_eq!(state.cursor, 2);
        state.move_cursor(Move::Last, 5, 2);
        assert_eq!(state.cursor, 4);
        state.move_cursor(Move::First, 5, 2);
        assert_eq!(state.cursor, 0);
        state.move_cursor(Move::Left, 5, 2);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_cursor_clamped_when_accounts_shrink() {
        let mut state = AppState::new();
        state.cursor = 9;
        state.move_cursor(Move::Right, 3, 1);
        assert_eq!(state.cursor, 2);
        state.move_cursor(Move::Right, 0, 1);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut state = AppState::new();
        state.scroll_by(-3, 10);
        assert_eq!(state.scroll, 0);
        state.scroll_by(25, 10);
        assert_eq!(state.scroll, 10);
        state.toggle_view();
        assert_eq!(state.view, DashboardView::Analytics);
        assert_eq!(state.scroll, 0);
    }

    #[test]
    fn test_update_replaces_set_and_clears_error() {
        let state = AppState::shared();
        state.write().set_error("boom");
        let set = SnapshotSet::from([("a".to_string(), Snapshot::new("openai", "a"))]);
        state.write().update_snapshots(set.clone());

        let s = state.read();
        assert_eq!(s.snapshots, set);
        assert!(s.error_message.is_none());
        assert_eq!(s.refresh_count, 1);
        assert!(s.last_refresh.is_some());
    }
}
