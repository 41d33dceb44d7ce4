//! The ui thread: a fixed-rate loop of input, state update and drawing.

use std::thread;
use std::time::{Duration, Instant};

use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::{debug, info};

use crate::errors::Result;
use crate::event::{self, AppEvent};
use crate::input::nav::Viewport;
use crate::input::{InputRouter, RouteContext};
use crate::state::Shared;
use crate::theme::ThemeManager;
use crate::ui::{Layout, Renderer};

/// Ui cycles per second.
pub const FPS: u32 = 60;

pub struct App {
    state: Shared,
    themes: ThemeManager,
    router: InputRouter,
    renderer: Renderer,
}

impl App {
    pub fn new(state: Shared, themes: ThemeManager, host: impl Into<String>) -> Self {
        Self {
            state,
            themes,
            router: InputRouter::new(),
            renderer: Renderer::new(host),
        }
    }

    pub fn themes(&self) -> &ThemeManager {
        &self.themes
    }

    /// Runs until the user quits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let budget = Duration::from_secs(1) / FPS;
        info!(fps = FPS, theme = %self.themes.current().name, "ui loop started");

        loop {
            let started = Instant::now();
            let events = event::drain()?;
            if !self.cycle(terminal, &events, started)? {
                break;
            }
            if let Some(rest) = budget.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }

        info!("ui loop stopped");
        Ok(())
    }

    /// One cycle: route `events`, write the ui fields back, draw.
    ///
    /// Returns `false` once an exit was requested; nothing is drawn then.
    pub fn cycle<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &[AppEvent],
        now: Instant,
    ) -> Result<bool> {
        let size = terminal.size()?;
        let layout = Layout::compute(Rect::new(0, 0, size.width, size.height));

        let (mut ui, total) = {
            let state = self.state.lock();
            (state.ui, state.process_count())
        };
        let routed = self.router.route(
            events,
            now,
            &mut ui,
            RouteContext {
                themes: &mut self.themes,
                total,
                page_rows: layout.page_rows,
            },
        );
        Viewport::new(total, layout.page_rows).clamp(&mut ui);
        self.state.lock().ui = ui;

        if routed.quit {
            return Ok(false);
        }
        if routed.theme_changed {
            debug!(theme = %self.themes.current().name, "theme switched");
        }

        let Self {
            state,
            themes,
            renderer,
            ..
        } = self;
        terminal.draw(|frame| {
            renderer.draw(frame, &ui, &routed, themes.current(), now, || state.lock().view());
        })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SharedState;
    use crate::types::{MetricSnapshot, ProcessRecord, SortMode, UiMode};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app_with(count: u32) -> (App, Shared) {
        let state = SharedState::shared(5);
        let processes = (1..=count)
            .map(|pid| ProcessRecord {
                pid,
                name: format!("proc{pid}"),
                working_set: u64::from(count - pid),
                ..ProcessRecord::default()
            })
            .collect();
        state.lock().publish(MetricSnapshot {
            processes,
            ..MetricSnapshot::default()
        });
        (App::new(state.clone(), ThemeManager::builtin(), "host"), state)
    }

    #[test]
    fn keys_update_the_shared_ui() {
        let (mut app, state) = app_with(100);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let now = Instant::now();

        let events = [key(KeyCode::End), key(KeyCode::F(1))];
        assert!(app.cycle(&mut terminal, &events, now).unwrap());

        let ui = state.lock().ui;
        assert_eq!(ui.selected, 99);
        // 40 rows leave 27 table rows.
        assert_eq!(ui.scroll, 73);
        assert_eq!(ui.sort, SortMode::Cpu);
    }

    #[test]
    fn rate_change_reaches_the_sampler_side() {
        let (mut app, state) = app_with(3);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        app.cycle(&mut terminal, &[key(KeyCode::F(5))], Instant::now())
            .unwrap();
        assert_eq!(state.lock().hz(), 10);
    }

    #[test]
    fn quit_stops_the_loop() {
        let (mut app, state) = app_with(3);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let now = Instant::now();

        assert!(app.cycle(&mut terminal, &[key(KeyCode::Char('m'))], now).unwrap());
        assert_eq!(state.lock().ui.mode, UiMode::MainMenu);
        let quit = [key(KeyCode::Down), key(KeyCode::Down), key(KeyCode::Enter)];
        assert!(!app.cycle(&mut terminal, &quit, now).unwrap());
    }

    #[test]
    fn empty_table_clamps_to_zero() {
        let (mut app, state) = app_with(0);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        app.cycle(&mut terminal, &[key(KeyCode::PageDown)], Instant::now())
            .unwrap();
        let ui = state.lock().ui;
        assert_eq!((ui.selected, ui.scroll), (0, 0));
    }
}
