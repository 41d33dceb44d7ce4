//! Modal overlays drawn over the base frame.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Widget};

use super::format::{ellipsis, middle_ellipsis, pad_right};
use super::panels::{framed, put};
use crate::theme::Theme;

const MENU_TITLE: &str = "restop";
const MENU_ITEMS: [&str; 3] = ["Options", "Help", "Quit"];
const MENU_DESCRIPTION: &str = "Theme & colors. Pick visual style that suits you.";

const PICKER_TITLE: &str = "Options — Theme";
const PICKER_HINTS: [&str; 3] = [
    "[←/↑] prev   [→/↓] next   [Enter/Esc] back",
    "←/↑ prev  →/↓ next  Enter/Esc",
    "←/↑  →/↓  Enter/Esc",
];
const PICKER_ASCII_HINT: &str = "Up/Down  Enter/Esc";

const HELP_KEYS: [(&str, &str); 8] = [
    ("Q", "Quit program"),
    ("Esc / m", "Open/Close menu"),
    ("H", "Show this help"),
    ("F1 / F2 / F3", "Sort by CPU% / MEM / PID"),
    ("F6", "Sort by NAME"),
    ("F5", "Cycle update Hz"),
    ("PgUp/PgDn", "Scroll processes"),
    ("↑/↓/Home/End", "Navigation"),
];
const HELP_KEY_WIDTH: usize = 12;

fn chars(s: &str) -> u16 {
    s.chars().count().min(usize::from(u16::MAX)) as u16
}

/// A `width` x `height` box centered in `area`, kept at least one row from
/// the top and two columns from the left, clipped to `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let top = (area.height.saturating_sub(height) / 2).max(1);
    let left = (area.width.saturating_sub(width) / 2).max(2);
    Rect::new(
        area.x.saturating_add(left),
        area.y.saturating_add(top),
        width,
        height,
    )
    .intersection(area)
}

/// Clears the box and paints its frame; returns the inside.
fn open(buf: &mut Buffer, area: Rect, title: &str, theme: &Theme) -> Rect {
    let area = area.intersection(buf.area);
    Clear.render(area, buf);
    framed(buf, area, title, theme.header, theme)
}

fn on_overlay(fg: Color, theme: &Theme) -> Style {
    Style::new().fg(fg).bg(theme.overlay.into())
}

pub fn main_menu(buf: &mut Buffer, area: Rect, theme: &Theme, menu_index: usize) {
    let width = 40_u16.max(chars(MENU_TITLE) + 8);
    let height = 12;
    let rect = centered(area, width, height);
    let inner = open(buf, rect, " Menu ", theme);

    let text = on_overlay(theme.text.into(), theme);
    for (i, item) in MENU_ITEMS.iter().enumerate() {
        let line = if i == menu_index {
            Line::styled(format!("> {item}"), theme.selection_style())
        } else {
            Line::styled(format!("  {item}"), text)
        };
        put(buf, inner, 1, 1 + i as u16, &line);
    }

    // description column on the right half.
    let info_dx = width / 2 - 1;
    let info_width = usize::from(inner.width.saturating_sub(info_dx + 1)).max(10);
    let info = [
        (MENU_TITLE, theme.header),
        ("Description", theme.dim),
        (MENU_DESCRIPTION, theme.text),
    ];
    for (row, (label, color)) in info.into_iter().enumerate() {
        let line = Line::styled(ellipsis(label, info_width), on_overlay(color.into(), theme));
        put(buf, inner, info_dx, 1 + row as u16, &line);
    }

    let hint_width = usize::from(width.saturating_sub(4));
    let long = "[↑/↓] select   [Enter] open   [Esc] close";
    let hint = if long.chars().count() <= hint_width {
        long.to_owned()
    } else {
        ellipsis("↑/↓  Enter  Esc", hint_width)
    };
    let dim = on_overlay(theme.dim.into(), theme);
    put(buf, inner, 1, height.saturating_sub(3), &Line::styled(hint, dim));
}

/// The first hint that fits `width` with two cells to spare.
fn picker_hint(width: usize) -> String {
    PICKER_HINTS
        .iter()
        .find(|hint| hint.chars().count() + 2 <= width)
        .map(|hint| (*hint).to_owned())
        .unwrap_or_else(|| ellipsis(PICKER_ASCII_HINT, width).trim_end().to_owned())
}

pub fn theme_picker(buf: &mut Buffer, area: Rect, theme: &Theme, name: &str) {
    let width = 36_u16.max(chars(PICKER_TITLE) + 6);
    let rect = centered(area, width, 7);
    let inner = open(buf, rect, " Options ", theme);

    let title_dx = inner.width.saturating_sub(chars(PICKER_TITLE)) / 2;
    let header = on_overlay(theme.header.into(), theme);
    put(buf, inner, title_dx, 0, &Line::styled(PICKER_TITLE, header));

    // two cells of padding inside the border, one spare on the right.
    let text_width = usize::from(width.saturating_sub(2)).saturating_sub(4);
    let prefix = "Theme: ";
    let name_width = text_width.saturating_sub(prefix.chars().count());
    let line = Line::from(vec![
        Span::styled(prefix, on_overlay(theme.text.into(), theme)),
        Span::styled(
            middle_ellipsis(name, name_width).trim_end().to_owned(),
            on_overlay(theme.accent.into(), theme),
        ),
    ]);
    put(buf, inner, 2, 2, &line);

    let dim = on_overlay(theme.dim.into(), theme);
    put(buf, inner, 2, 4, &Line::styled(picker_hint(text_width), dim));
}

pub fn help(buf: &mut Buffer, area: Rect, theme: &Theme) {
    let width = area.width.saturating_sub(8).min(78);
    let height = area.height.saturating_sub(6).min(18);
    let rect = centered(area, width, height);
    let inner = open(buf, rect, " Help ", theme);

    let header = on_overlay(theme.header.into(), theme);
    put(buf, inner, 1, 1, &Line::styled("Keys — Description", header));

    let key_style = on_overlay(theme.accent.into(), theme);
    let text = on_overlay(theme.text.into(), theme);
    for (row, (key, description)) in HELP_KEYS.iter().enumerate() {
        let line = Line::from(vec![
            Span::styled(pad_right(key, HELP_KEY_WIDTH), key_style),
            Span::styled(format!("  {description}"), text),
        ]);
        put(buf, inner, 1, 3 + row as u16, &line);
    }

    let dim = on_overlay(theme.dim.into(), theme);
    put(buf, inner, 1, height.saturating_sub(3), &Line::styled("[Esc/Enter] back", dim));
}
