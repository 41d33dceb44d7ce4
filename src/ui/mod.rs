//! Drawing: the base frame of panels and table, and the modal overlays on top.
//!
//! The base frame is kept in an off-screen [`Buffer`]. While a modal is open
//! and nothing changes, only the overlay is recomposed over the kept base.

use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::{Margin, Rect};
use ratatui::style::Style;
use ratatui::Frame;

use crate::input::Routed;
use crate::state::{UiFields, View};
use crate::theme::Theme;
use crate::types::UiMode;

pub mod format;
pub mod layout;
pub mod overlays;
pub mod panels;
pub mod sparkline;
pub mod table;

pub use self::layout::Layout;

/// How long an idle modal may show a stale base frame.
pub const MODAL_REFRESH: Duration = Duration::from_millis(500);

/// Whether the base frame must be recomposed this cycle.
///
/// `since_modal_base` is the time since the base was last composed while a
/// modal was open, `None` if that never happened.
pub fn needs_base(routed: &Routed, mode: UiMode, prev_mode: UiMode, since_modal_base: Option<Duration>) -> bool {
    if routed.changed || routed.resized || mode == UiMode::Normal || mode != prev_mode {
        return true;
    }
    since_modal_base.map_or(true, |elapsed| elapsed >= MODAL_REFRESH)
}

/// Paints the whole base frame into `buf`.
pub fn compose(
    buf: &mut Buffer,
    layout: &Layout,
    view: &View,
    ui: &UiFields,
    theme: &Theme,
    host: &str,
    clock: &str,
) {
    let area = buf.area;
    buf.set_style(area, Style::new().bg(theme.panel.into()));
    buf.set_style(
        area.inner(Margin::new(1, 1)),
        Style::new().bg(theme.background.into()),
    );

    panels::header(buf, layout.header, theme, host, view.snapshot.uptime_secs, clock, ui.hz);
    panels::cpu(buf, layout.cpu, theme, view, ui.hz);
    panels::memory(buf, layout.memory, theme, view);
    panels::processes(buf, layout.table, theme, view, ui, layout.page_rows);
    panels::footer(buf, layout.footer, theme);
}

/// Draws the modal for `ui.mode`, if any.
pub fn overlay(buf: &mut Buffer, area: Rect, ui: &UiFields, theme: &Theme) {
    match ui.mode {
        UiMode::Normal => {}
        UiMode::MainMenu => overlays::main_menu(buf, area, theme, ui.menu_index),
        UiMode::ThemePicker => overlays::theme_picker(buf, area, theme, &theme.name),
        UiMode::Help => overlays::help(buf, area, theme),
    }
}

/// Keeps the last base frame between cycles.
#[derive(Debug)]
pub struct Renderer {
    base: Buffer,
    last_modal_base: Option<Instant>,
    prev_mode: UiMode,
    host: String,
}

impl Renderer {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            base: Buffer::empty(Rect::default()),
            last_modal_base: None,
            prev_mode: UiMode::Normal,
            host: host.into(),
        }
    }

    /// Draws one frame; returns whether the base was recomposed.
    ///
    /// `view` is only called when the base is recomposed, so an idle modal
    /// never touches the shared state.
    pub fn draw(
        &mut self,
        frame: &mut Frame<'_>,
        ui: &UiFields,
        routed: &Routed,
        theme: &Theme,
        now: Instant,
        view: impl FnOnce() -> View,
    ) -> bool {
        let area = frame.area();
        let since_modal_base = self.last_modal_base.map(|at| now.saturating_duration_since(at));
        let redraw =
            self.base.area != area || needs_base(routed, ui.mode, self.prev_mode, since_modal_base);

        if redraw {
            let view = view();
            let layout = Layout::compute(area);
            let clock = chrono::Local::now().format("%H:%M:%S").to_string();
            let mut base = Buffer::empty(area);
            compose(&mut base, &layout, &view, ui, theme, &self.host, &clock);
            self.base = base;
            self.last_modal_base = ui.mode.is_modal().then_some(now);
        }

        let buf = frame.buffer_mut();
        buf.clone_from(&self.base);
        overlay(buf, area, ui, theme);

        self.prev_mode = ui.mode;
        redraw
    }
}
