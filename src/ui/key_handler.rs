//! Key handling, split into "decide" and "execute".
//!
//! [`resolve_key`] reads the state and returns a [`KeyAction`]; the app
//! applies it once it knows the current grid and report sizes.

use crossterm::event::{KeyCode, KeyModifiers};
use quotaboard_core::DashboardView;

use crate::state::{AppState, Move};

/// Lines scrolled by one PageUp/PageDown in the analytics view
pub const PAGE_LINES: isize = 10;

/// Action to apply after the key is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// No action needed
    None,
    Quit,
    CloseHelp,
    ToggleHelp,
    ToggleView,
    CycleSort,
    /// Move the tile cursor
    Move(Move),
    /// Scroll the analytics report by lines
    Scroll(isize),
}

/// Decide what a key press does in the current state
pub fn resolve_key(state: &AppState, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    // Any key closes the help popup
    if state.show_help {
        return KeyAction::CloseHelp;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('?') => KeyAction::ToggleHelp,
        KeyCode::Tab | KeyCode::BackTab => KeyAction::ToggleView,
        KeyCode::Char('s') => KeyAction::CycleSort,
        _ => match state.view {
            DashboardView::Tiles => resolve_tiles_key(code),
            DashboardView::Analytics => resolve_analytics_key(code),
        },
    }
}

fn resolve_tiles_key(code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Char('h') | KeyCode::Left => KeyAction::Move(Move::Left),
        KeyCode::Char('l') | KeyCode::Right => KeyAction::Move(Move::Right),
        KeyCode::Char('k') | KeyCode::Up => KeyAction::Move(Move::Up),
        KeyCode::Char('j') | KeyCode::Down => KeyAction::Move(Move::Down),
        KeyCode::Char('g') | KeyCode::Home => KeyAction::Move(Move::First),
        KeyCode::Char('G') | KeyCode::End => KeyAction::Move(Move::Last),
        _ => KeyAction::None,
    }
}

fn resolve_analytics_key(code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Char('k') | KeyCode::Up => KeyAction::Scroll(-1),
        KeyCode::Char('j') | KeyCode::Down => KeyAction::Scroll(1),
        KeyCode::PageUp => KeyAction::Scroll(-PAGE_LINES),
        KeyCode::PageDown | KeyCode::Char(' ') => KeyAction::Scroll(PAGE_LINES),
        KeyCode::Char('g') | KeyCode::Home => KeyAction::Scroll(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => KeyAction::Scroll(isize::MAX),
        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(state: &AppState, code: KeyCode) -> KeyAction {
        resolve_key(state, code, KeyModifiers::NONE)
    }

    #[test]
    fn test_tiles_keys() {
        let state = AppState::new();
        assert_eq!(key(&state, KeyCode::Char('j')), KeyAction::Move(Move::Down));
        assert_eq!(key(&state, KeyCode::Left), KeyAction::Move(Move::Left));
        assert_eq!(key(&state, KeyCode::PageDown), KeyAction::None);
        assert_eq!(key(&state, KeyCode::Tab), KeyAction::ToggleView);
        assert_eq!(key(&state, KeyCode::Char('q')), KeyAction::Quit);
    }

    #[test]
    fn test_analytics_keys() {
        let mut state = AppState::new();
        state.toggle_view();
        assert_eq!(key(&state, KeyCode::PageDown), KeyAction::Scroll(PAGE_LINES));
        assert_eq!(key(&state, KeyCode::Up), KeyAction::Scroll(-1));
        assert_eq!(key(&state, KeyCode::Char('s')), KeyAction::CycleSort);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut state = AppState::new();
        state.toggle_help();
        assert_eq!(key(&state, KeyCode::Char('q')), KeyAction::CloseHelp);
        assert_eq!(
            resolve_key(&state, KeyCode::Char('c'), KeyModifiers::CONTROL),
            KeyAction::Quit
        );
    }
}
