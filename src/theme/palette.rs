//! Colors and the palette every theme fills in.

use ratatui::style::{Color, Style};

/// A 24-bit color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const WHITE: Rgb = Rgb::new(255, 255, 255);
pub const BLACK: Rgb = Rgb::new(0, 0, 0);

/// Fixed warning color, shared by every theme.
pub const WARN: Rgb = Rgb::new(255, 210, 120);
/// Fixed critical color, shared by every theme.
pub const CRIT: Rgb = Rgb::new(255, 120, 120);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Adds `amount` to every channel, saturating at 255.
    pub fn lighten(self, amount: u8) -> Self {
        Self::new(
            self.r.saturating_add(amount),
            self.g.saturating_add(amount),
            self.b.saturating_add(amount),
        )
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
        };
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    /// Parses `RRGGBB` with an optional leading `#`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb(c.r, c.g, c.b)
    }
}

/// A named palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub name: String,

    pub text: Rgb,
    pub dim: Rgb,
    pub header: Rgb,

    pub panel: Rgb,
    pub background: Rgb,
    pub overlay: Rgb,

    pub accent: Rgb,
    pub selection_fg: Rgb,
    pub selection_bg: Rgb,

    pub meter_bg: Rgb,
    pub frame: Rgb,
    pub divider: Rgb,

    pub bar_low: Rgb,
    pub bar_high: Rgb,

    pub box_cpu: Rgb,
    pub box_mem: Rgb,
    pub box_proc: Rgb,
}

impl Theme {
    /// The name of the palette used when no theme file could be loaded.
    pub const BUILTIN_NAME: &'static str = "Default";

    /// The palette before any file is applied, under the given name.
    pub fn base(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),

            text: Rgb::new(220, 220, 220),
            dim: Rgb::new(160, 160, 160),
            header: Rgb::new(200, 200, 200),

            panel: Rgb::new(20, 20, 20),
            background: Rgb::new(28, 28, 28),
            overlay: Rgb::new(12, 12, 12),

            accent: Rgb::new(120, 220, 255),
            selection_fg: Rgb::new(255, 255, 255),
            selection_bg: Rgb::new(120, 60, 140),

            meter_bg: Rgb::new(60, 60, 60),
            frame: Rgb::new(90, 90, 90),
            divider: Rgb::new(60, 60, 60),

            bar_low: Rgb::new(120, 255, 60),
            bar_high: Rgb::new(255, 120, 60),

            box_cpu: Rgb::new(120, 200, 255),
            box_mem: Rgb::new(180, 255, 120),
            box_proc: Rgb::new(180, 160, 255),
        }
    }

    /// Plain text on the background.
    pub fn text_style(&self) -> Style {
        Style::new().fg(self.text.into()).bg(self.background.into())
    }

    pub fn dim_style(&self) -> Style {
        Style::new().fg(self.dim.into()).bg(self.background.into())
    }

    pub fn header_style(&self) -> Style {
        Style::new().fg(self.header.into()).bg(self.background.into())
    }

    pub fn accent_style(&self) -> Style {
        Style::new().fg(self.accent.into()).bg(self.background.into())
    }

    pub fn selection_style(&self) -> Style {
        Style::new()
            .fg(self.selection_fg.into())
            .bg(self.selection_bg.into())
    }

    /// Foreground for a percentage: ok, warning above 50, critical above 80.
    pub fn level(&self, percent: f64) -> Rgb {
        if percent > 80.0 {
            CRIT
        } else if percent > 50.0 {
            WARN
        } else {
            self.bar_low
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::base(Self::BUILTIN_NAME)
    }
}
