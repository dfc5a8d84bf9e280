use anyhow::Result;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    widgets::Paragraph,
    Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

use quotaboard_core::{Dashboard, OverrideRegistry, Paint, PlainPaint, RenderContext};

use crate::config::{Settings, StartView};
use crate::source::{DemoSource, FileSource, SourceMessage};
use crate::state::{AppState, SharedState};

use super::components::{HelpPopup, StatusBar};
use super::key_handler::{resolve_key, KeyAction};
use super::paint::{to_text, AnsiPaint};

/// Where the app gets its snapshots from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Re-read the configured snapshot document
    File,
    /// Generated demo accounts
    Demo,
}

/// Main application
pub struct App {
    state: SharedState,
    settings: Settings,
    registry: OverrideRegistry,
    source: SourceKind,
}

impl App {
    /// Create a new application
    pub fn new(settings: Settings, registry: OverrideRegistry, source: SourceKind) -> Self {
        let state = AppState::shared();
        {
            let mut s = state.write();
            s.filter = settings.filter.clone();
            if settings.ui.start_view == StartView::Analytics {
                s.toggle_view();
            }
        }

        Self {
            state,
            settings,
            registry,
            source,
        }
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        let mut source_rx = self.start_source()?;

        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal, &mut source_rx).await;

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        // Stop the source task on its next tick
        self.state.write().quit();

        result
    }

    fn start_source(&self) -> Result<mpsc::Receiver<SourceMessage>> {
        let refresh = Duration::from_millis(self.settings.refresh_ms);
        match self.source {
            SourceKind::Demo => Ok(DemoSource::new(refresh, self.state.clone()).start()),
            SourceKind::File => {
                let Some(path) = self.settings.snapshots.clone() else {
                    anyhow::bail!(
                        "No snapshot file configured (use --snapshots or the demo command)"
                    );
                };
                tracing::info!(path = %path.display(), "watching snapshot file");
                Ok(FileSource::new(path, refresh, self.state.clone()).start())
            }
        }
    }

    fn paint(&self) -> &'static dyn Paint {
        if self.settings.ui.color {
            &AnsiPaint
        } else {
            &PlainPaint
        }
    }

    fn context(&self, state: &AppState, width: u16, height: u16) -> RenderContext {
        RenderContext::new(Utc::now(), width as usize, height as usize)
            .with_view(state.view)
            .with_cursor(state.cursor)
            .with_scroll(state.scroll)
            .with_filter(state.filter.clone())
            .with_sort(state.sort)
            .with_max_columns(self.settings.ui.max_columns)
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        source_rx: &mut mpsc::Receiver<SourceMessage>,
    ) -> Result<()> {
        let dashboard = Dashboard::new(&self.registry);

        loop {
            if !self.state.read().running {
                break;
            }

            // The dashboard block is built outside the draw closure so
            // decoding errors propagate
            let size = terminal.size()?;
            let body_height = size.height.saturating_sub(1);
            let text = {
                let state = self.state.read();
                let ctx = self.context(&state, size.width, body_height);
                to_text(&dashboard.render(&state.snapshots, &ctx, self.paint()))?
            };

            terminal.draw(|frame| {
                let state = self.state.read();
                let areas = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(1)])
                    .split(frame.area());

                frame.render_widget(Paragraph::new(text), areas[0]);
                StatusBar::render(frame, areas[1], &state, Utc::now());

                if state.show_help {
                    HelpPopup::render(frame, HelpPopup::area(frame.area(), 60, 70));
                }
            })?;

            // Handle events with timeout
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(
                            &dashboard,
                            key.code,
                            key.modifiers,
                            size.width,
                            body_height,
                        );
                    }
                }
            }

            // Process source messages
            while let Ok(msg) = source_rx.try_recv() {
                let mut state = self.state.write();
                match msg {
                    SourceMessage::SnapshotsUpdated(snapshots) => state.update_snapshots(snapshots),
                    SourceMessage::Error(error) => state.set_error(error),
                }
            }
        }

        Ok(())
    }

    fn handle_key(
        &self,
        dashboard: &Dashboard,
        code: KeyCode,
        modifiers: KeyModifiers,
        width: u16,
        height: u16,
    ) {
        let action = resolve_key(&self.state.read(), code, modifiers);

        let mut state = self.state.write();
        match action {
            KeyAction::None => {}
            KeyAction::Quit => state.quit(),
            KeyAction::CloseHelp => state.show_help = false,
            KeyAction::ToggleHelp => state.toggle_help(),
            KeyAction::ToggleView => state.toggle_view(),
            KeyAction::CycleSort => state.cycle_sort(),
            KeyAction::Move(movement) => {
                let ctx = self.context(&state, width, height);
                let count = dashboard.accounts(&state.snapshots, &state.filter).len();
                let columns = dashboard.grid(&state.snapshots, &ctx).columns;
                state.move_cursor(movement, count, columns);
            }
            KeyAction::Scroll(delta) => {
                let ctx = self.context(&state, width, height);
                let max = dashboard.max_scroll(&state.snapshots, &ctx);
                state.scroll_by(delta, max);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Move;
    use crate::source::demo_snapshots;
    use pretty_assertions::assert_eq;
    use quotaboard_core::DashboardView;

    fn demo_app() -> App {
        let settings = Settings::default();
        let registry = settings.registry().unwrap();
        let app = App::new(settings, registry, SourceKind::Demo);
        app.state
            .write()
            .update_snapshots(demo_snapshots(0, Utc::now()));
        app
    }

    #[test]
    fn test_start_view_and_filter_from_settings() {
        let settings = Settings {
            filter: "work".to_string(),
            ui: crate::config::UiSettings {
                start_view: StartView::Analytics,
                ..Default::default()
            },
            ..Default::default()
        };
        let registry = settings.registry().unwrap();
        let app = App::new(settings, registry, SourceKind::Demo);
        let state = app.state.read();
        assert_eq!(state.view, DashboardView::Analytics);
        assert_eq!(state.filter, "work");
    }

    #[test]
    fn test_keys_move_cursor_within_grid() {
        let app = demo_app();
        let dashboard = Dashboard::new(&app.registry);

        app.handle_key(&dashboard, KeyCode::Char('G'), KeyModifiers::NONE, 200, 60);
        let last = dashboard
            .accounts(&app.state.read().snapshots, "")
            .len()
            - 1;
        assert_eq!(app.state.read().cursor, last);

        app.handle_key(&dashboard, KeyCode::Char('l'), KeyModifiers::NONE, 200, 60);
        assert_eq!(app.state.read().cursor, last);

        app.state.write().move_cursor(Move::First, last + 1, 1);
        app.handle_key(&dashboard, KeyCode::Char('l'), KeyModifiers::NONE, 200, 60);
        assert_eq!(app.state.read().cursor, 1);
    }

    #[test]
    fn test_scroll_is_clamped_to_report() {
        let app = demo_app();
        let dashboard = Dashboard::new(&app.registry);

        app.handle_key(&dashboard, KeyCode::Tab, KeyModifiers::NONE, 100, 12);
        app.handle_key(&dashboard, KeyCode::End, KeyModifiers::NONE, 100, 12);

        let state = app.state.read();
        let ctx = app.context(&state, 100, 12);
        let max = dashboard.max_scroll(&state.snapshots, &ctx);
        assert!(max > 0);
        assert_eq!(state.scroll, max);
    }

    #[test]
    fn test_file_source_requires_path() {
        let settings = Settings::default();
        let registry = settings.registry().unwrap();
        let app = App::new(settings, registry, SourceKind::File);
        assert!(app.start_source().is_err());
    }
}
