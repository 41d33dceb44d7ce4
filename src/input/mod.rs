//! Keyboard and mouse handling: the ui state machine.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::event::AppEvent;
use crate::state::UiFields;
use crate::theme::ThemeManager;
use crate::types::{SortMode, UiMode};

pub mod debounce;
pub mod nav;

use self::debounce::Debouncer;
use self::nav::Viewport;

/// Refresh rates F5 cycles through.
pub const RATES: [u32; 4] = [2, 5, 10, 20];

/// Rows one wheel notch scrolls without a modifier.
pub const WHEEL_STEP: usize = 3;

/// Entries of the main menu, top to bottom.
pub const MENU_ITEMS: usize = 3;

/// What a batch of events did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Routed {
    /// Some ui field or the theme changed.
    pub changed: bool,
    pub resized: bool,
    pub quit: bool,
    pub theme_changed: bool,
}

/// Everything the router may touch besides the ui fields.
pub struct RouteContext<'a> {
    pub themes: &'a mut ThemeManager,
    /// Rows in the current snapshot.
    pub total: usize,
    /// Visible table rows.
    pub page_rows: usize,
}

/// Turns events into transitions of the [`UiFields`].
#[derive(Debug, Default)]
pub struct InputRouter {
    debounce: Debouncer<KeyCode>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(
        &mut self,
        events: &[AppEvent],
        now: Instant,
        ui: &mut UiFields,
        ctx: RouteContext<'_>,
    ) -> Routed {
        let view = Viewport::new(ctx.total, ctx.page_rows);
        let mut routed = Routed::default();

        for event in events {
            match *event {
                AppEvent::Resize => {
                    routed.resized = true;
                    routed.changed = true;
                }
                AppEvent::Wheel { down, page } if ui.mode == UiMode::Normal => {
                    let step = (if page { view.page_rows } else { WHEEL_STEP }) as isize;
                    view.scroll_by(ui, if down { step } else { -step });
                    routed.changed = true;
                }
                AppEvent::Wheel { .. } => {}
                AppEvent::Key(key) => self.key(key, now, ui, view, ctx.themes, &mut routed),
            }
            if routed.quit {
                break;
            }
        }

        routed
    }

    fn key(
        &mut self,
        key: KeyEvent,
        now: Instant,
        ui: &mut UiFields,
        view: Viewport,
        themes: &mut ThemeManager,
        routed: &mut Routed,
    ) {
        let code = normalize(key.code);

        if code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            routed.quit = true;
            return;
        }

        // navigation keys may auto-repeat; everything else is debounced.
        let mut fire = |code: KeyCode| self.debounce.allow(code, now);

        if code == KeyCode::Esc {
            if fire(code) {
                ui.mode = match ui.mode {
                    UiMode::ThemePicker | UiMode::Help => UiMode::MainMenu,
                    UiMode::MainMenu => UiMode::Normal,
                    UiMode::Normal => UiMode::MainMenu,
                };
                routed.changed = true;
            }
            return;
        }

        match ui.mode {
            UiMode::MainMenu => match code {
                KeyCode::Up => {
                    ui.menu_index = ui.menu_index.saturating_sub(1);
                    routed.changed = true;
                }
                KeyCode::Down => {
                    ui.menu_index = (ui.menu_index + 1).min(MENU_ITEMS - 1);
                    routed.changed = true;
                }
                KeyCode::Enter if fire(code) => {
                    match ui.menu_index {
                        0 => ui.mode = UiMode::ThemePicker,
                        1 => ui.mode = UiMode::Help,
                        _ => routed.quit = true,
                    }
                    routed.changed = true;
                }
                _ => {}
            },

            UiMode::ThemePicker => match code {
                KeyCode::Left | KeyCode::Up => {
                    themes.prev();
                    routed.theme_changed = true;
                    routed.changed = true;
                }
                KeyCode::Right | KeyCode::Down => {
                    themes.next();
                    routed.theme_changed = true;
                    routed.changed = true;
                }
                KeyCode::Enter if fire(code) => {
                    ui.mode = UiMode::MainMenu;
                    routed.changed = true;
                }
                _ => {}
            },

            UiMode::Help => {
                if code == KeyCode::Enter && fire(code) {
                    ui.mode = UiMode::MainMenu;
                    routed.changed = true;
                }
            }

            UiMode::Normal => {
                let navigation = matches!(
                    code,
                    KeyCode::Up
                        | KeyCode::Down
                        | KeyCode::PageUp
                        | KeyCode::PageDown
                        | KeyCode::Home
                        | KeyCode::End
                );
                // unbound keys never take a debounce slot.
                if !navigation && (!is_normal_binding(code) || !fire(code)) {
                    return;
                }
                Self::normal_key(code, ui, view, themes, routed);
            }
        }
    }

    fn normal_key(
        code: KeyCode,
        ui: &mut UiFields,
        view: Viewport,
        themes: &mut ThemeManager,
        routed: &mut Routed,
    ) {
        let before = *ui;
        match code {
            KeyCode::Char('q') => routed.quit = true,
            KeyCode::Char('h') => ui.mode = UiMode::Help,
            KeyCode::Char('m') => ui.mode = UiMode::MainMenu,
            KeyCode::Char('t') => {
                themes.next();
                routed.theme_changed = true;
            }
            KeyCode::Char('y') => {
                themes.prev();
                routed.theme_changed = true;
            }

            KeyCode::F(1) => ui.sort = SortMode::Cpu,
            KeyCode::F(2) => ui.sort = SortMode::WorkingSet,
            KeyCode::F(3) => ui.sort = SortMode::Pid,
            KeyCode::F(6) => ui.sort = SortMode::Name,
            KeyCode::F(5) => {
                ui.hz = next_rate(ui.hz);
                debug!(hz = ui.hz, "refresh rate changed");
            }

            KeyCode::PageDown => view.page_down(ui),
            KeyCode::PageUp => view.page_up(ui),
            KeyCode::Down => view.move_by(ui, 1),
            KeyCode::Up => view.move_by(ui, -1),
            KeyCode::Home => view.home(ui),
            KeyCode::End => view.end(ui),
            _ => return,
        }

        routed.changed |= routed.theme_changed || *ui != before;
    }
}

/// Non-navigation keys that do something in Normal mode.
fn is_normal_binding(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Char('q' | 'h' | 'm' | 't' | 'y') | KeyCode::F(1 | 2 | 3 | 5 | 6)
    )
}

/// Letters act the same with or without Shift.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// The next rate above `hz`, wrapping to the slowest.
pub fn next_rate(hz: u32) -> u32 {
    RATES
        .iter()
        .copied()
        .find(|&rate| rate > hz)
        .unwrap_or(RATES[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use std::time::Duration;

    struct Harness {
        router: InputRouter,
        ui: UiFields,
        themes: ThemeManager,
        total: usize,
        now: Instant,
    }

    impl Harness {
        fn new() -> Self {
            let themes = ["Dracula", "Gruvbox", "Nord"]
                .into_iter()
                .map(Theme::base)
                .collect();
            Self {
                router: InputRouter::new(),
                ui: UiFields::default(),
                themes: ThemeManager::from_themes(themes).unwrap(),
                total: 50,
                now: Instant::now(),
            }
        }

        fn send(&mut self, events: &[AppEvent]) -> Routed {
            let ctx = RouteContext {
                themes: &mut self.themes,
                total: self.total,
                page_rows: 10,
            };
            self.router.route(events, self.now, &mut self.ui, ctx)
        }

        fn press(&mut self, code: KeyCode) -> Routed {
            self.send(&[key(code)])
        }

        /// Lets the debounce window pass before the next press.
        fn later(&mut self, ms: u64) -> &mut Self {
            self.now += Duration::from_millis(ms);
            self
        }
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn escape_toggles_menu() {
        let mut h = Harness::new();
        assert!(h.press(KeyCode::Esc).changed);
        assert_eq!(h.ui.mode, UiMode::MainMenu);
        h.later(200).press(KeyCode::Esc);
        assert_eq!(h.ui.mode, UiMode::Normal);
    }

    #[test]
    fn quick_repeat_is_debounced() {
        let mut h = Harness::new();
        h.press(KeyCode::Esc);
        let routed = h.later(50).press(KeyCode::Esc);
        assert!(!routed.changed);
        assert_eq!(h.ui.mode, UiMode::MainMenu);

        h.later(200).press(KeyCode::Esc);
        assert_eq!(h.ui.mode, UiMode::Normal);
    }

    #[test]
    fn repeated_sort_key_in_one_batch_acts_once() {
        let mut h = Harness::new();
        h.send(&[key(KeyCode::Char('t')), key(KeyCode::Char('t'))]);
        assert_eq!(h.themes.current().name, "Gruvbox");
    }

    #[test]
    fn unbound_keys_do_not_evict_bound_ones() {
        let mut h = Harness::new();
        h.press(KeyCode::Char('t'));
        assert_eq!(h.themes.current().name, "Gruvbox");

        for c in ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'i', 'j'] {
            h.later(1).press(KeyCode::Char(c));
        }
        let routed = h.later(40).press(KeyCode::Char('t'));
        assert!(!routed.changed);
        assert_eq!(h.themes.current().name, "Gruvbox");
    }

    #[test]
    fn menu_cursor_is_clamped_and_enter_opens_items() {
        let mut h = Harness::new();
        h.press(KeyCode::Char('m'));
        assert_eq!(h.ui.mode, UiMode::MainMenu);

        for _ in 0..5 {
            h.press(KeyCode::Down);
        }
        assert_eq!(h.ui.menu_index, 2);
        h.press(KeyCode::Up);
        h.press(KeyCode::Up);
        h.press(KeyCode::Up);
        assert_eq!(h.ui.menu_index, 0);

        h.press(KeyCode::Enter);
        assert_eq!(h.ui.mode, UiMode::ThemePicker);
    }

    #[test]
    fn menu_quit_item_requests_exit() {
        let mut h = Harness::new();
        h.ui.mode = UiMode::MainMenu;
        h.ui.menu_index = 2;
        assert!(h.press(KeyCode::Enter).quit);
    }

    #[test]
    fn picker_cycles_themes_and_returns_to_menu() {
        let mut h = Harness::new();
        h.ui.mode = UiMode::ThemePicker;

        let routed = h.press(KeyCode::Left);
        assert!(routed.theme_changed);
        assert_eq!(h.themes.current().name, "Nord");
        h.press(KeyCode::Down);
        h.press(KeyCode::Right);
        assert_eq!(h.themes.current().name, "Gruvbox");

        h.press(KeyCode::Enter);
        assert_eq!(h.ui.mode, UiMode::MainMenu);
    }

    #[test]
    fn help_opens_and_closes() {
        let mut h = Harness::new();
        h.press(KeyCode::Char('H'));
        assert_eq!(h.ui.mode, UiMode::Help);
        // keys other than enter and escape are ignored.
        assert!(!h.later(200).press(KeyCode::Char('q')).quit);
        h.later(200).press(KeyCode::Enter);
        assert_eq!(h.ui.mode, UiMode::MainMenu);
    }

    #[test]
    fn function_keys_pick_sort_and_rate() {
        let mut h = Harness::new();
        h.press(KeyCode::F(1));
        assert_eq!(h.ui.sort, SortMode::Cpu);
        h.press(KeyCode::F(6));
        assert_eq!(h.ui.sort, SortMode::Name);
        h.press(KeyCode::F(3));
        assert_eq!(h.ui.sort, SortMode::Pid);
        h.press(KeyCode::F(2));
        assert_eq!(h.ui.sort, SortMode::WorkingSet);

        assert_eq!(h.ui.hz, 5);
        h.press(KeyCode::F(5));
        assert_eq!(h.ui.hz, 10);
        h.later(200).press(KeyCode::F(5));
        h.later(200).press(KeyCode::F(5));
        assert_eq!(h.ui.hz, 2);
    }

    #[test]
    fn rates_wrap() {
        assert_eq!(next_rate(2), 5);
        assert_eq!(next_rate(7), 10);
        assert_eq!(next_rate(20), 2);
        assert_eq!(next_rate(60), 2);
    }

    #[test]
    fn end_then_page_up() {
        let mut h = Harness::new();
        h.press(KeyCode::End);
        assert_eq!((h.ui.selected, h.ui.scroll), (49, 40));
        h.press(KeyCode::PageUp);
        assert_eq!((h.ui.selected, h.ui.scroll), (39, 30));
    }

    #[test]
    fn arrows_are_not_debounced() {
        let mut h = Harness::new();
        h.send(&[key(KeyCode::Down), key(KeyCode::Down), key(KeyCode::Down)]);
        assert_eq!(h.ui.selected, 3);
    }

    #[test]
    fn wheel_scrolls_only_in_normal_mode() {
        let mut h = Harness::new();
        h.send(&[AppEvent::Wheel {
            down: true,
            page: false,
        }]);
        assert_eq!((h.ui.selected, h.ui.scroll), (3, 3));

        h.send(&[AppEvent::Wheel {
            down: true,
            page: true,
        }]);
        assert_eq!((h.ui.selected, h.ui.scroll), (13, 13));

        h.ui.mode = UiMode::Help;
        let routed = h.send(&[AppEvent::Wheel {
            down: false,
            page: false,
        }]);
        assert!(!routed.changed);
        assert_eq!(h.ui.scroll, 13);
    }

    #[test]
    fn quit_and_ctrl_c() {
        let mut h = Harness::new();
        assert!(h.press(KeyCode::Char('q')).quit);

        let mut h = Harness::new();
        h.ui.mode = UiMode::ThemePicker;
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(h.send(&[ctrl_c]).quit);
    }

    #[test]
    fn resize_is_reported() {
        let mut h = Harness::new();
        let routed = h.send(&[AppEvent::Resize]);
        assert!(routed.resized && routed.changed);
    }
}
