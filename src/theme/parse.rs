//! Reading btop-style `.theme` files.
//!
//! Each recognized line looks like `theme[main_bg]="#1d2021"`. Everything
//! else in the file is ignored, including keys this palette has no slot for.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::contrast;
use super::palette::{Rgb, Theme};

/// Per-channel increment used to derive the background and overlay from the panel.
pub const LIGHTEN_STEP: u8 = 14;

const BOM: char = '\u{feff}';

fn line_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"theme\[(.+?)\]\s*=\s*"(#?[A-Fa-f0-9]{6})""#).ok())
        .as_ref()
}

/// Reads and finishes the theme stored at `path`, named after the file stem.
pub fn load_file(path: &Path) -> io::Result<Theme> {
    let bytes = fs::read(path)?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(parse(name, &String::from_utf8_lossy(&bytes)))
}

/// Builds a finished theme from file contents: keys applied over the base
/// palette, derived slots filled in, then contrast enforced.
pub fn parse(name: impl Into<String>, text: &str) -> Theme {
    let mut theme = Theme::base(name);
    let text = text.strip_prefix(BOM).unwrap_or(text);

    if let Some(pattern) = line_pattern() {
        for line in text.lines() {
            if let Some(caps) = pattern.captures(line) {
                if let Some(color) = Rgb::parse_hex(&caps[2]) {
                    apply_key(&mut theme, &caps[1], color);
                }
            }
        }
    }

    derive(&mut theme);
    contrast::enforce(&mut theme);
    theme
}

fn apply_key(theme: &mut Theme, key: &str, color: Rgb) {
    match key {
        "main_bg" => theme.panel = color,
        "main_fg" => theme.text = color,
        "title" | "graph_text" => theme.header = color,
        "hi_fg" => theme.accent = color,
        "selected_bg" => theme.selection_bg = color,
        "selected_fg" => theme.selection_fg = color,
        "inactive_fg" => theme.dim = color,
        "meter_bg" => theme.meter_bg = color,
        "cpu_box" => theme.box_cpu = color,
        "mem_box" => theme.box_mem = color,
        "proc_box" => theme.box_proc = color,
        "div_line" => {
            theme.frame = color;
            theme.divider = color;
        }
        "bar_lo" | "cpu_color_low" => theme.bar_low = color,
        "bar_hi" | "cpu_color_high" => theme.bar_high = color,
        _ => {}
    }
}

/// Fills slots the file left untouched, in dependency order.
///
/// Each rule only fires while its slot still holds the base value, so later
/// rules see the results of earlier ones.
pub fn derive(theme: &mut Theme) {
    let base = Theme::base("");

    if theme.overlay == base.overlay {
        theme.overlay = theme.panel.lighten(LIGHTEN_STEP);
    }
    if theme.background == base.background {
        theme.background = theme.panel.lighten(LIGHTEN_STEP);
    }
    if theme.frame == base.frame {
        theme.frame = theme.meter_bg;
    }
    if theme.divider == base.divider {
        theme.divider = theme.frame;
    }
}
