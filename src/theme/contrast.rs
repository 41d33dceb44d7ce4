//! WCAG relative luminance and contrast ratios.

use super::palette::{Rgb, Theme, BLACK, WHITE};

/// Minimum ratio for body text and selection text.
pub const MIN_TEXT_CONTRAST: f64 = 4.5;
/// Minimum ratio for de-emphasized text.
pub const MIN_DIM_CONTRAST: f64 = 3.0;

pub fn relative_luminance(c: Rgb) -> f64 {
    fn channel(v: u8) -> f64 {
        let u = f64::from(v) / 255.0;
        if u <= 0.03928 {
            u / 12.92
        } else {
            ((u + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * channel(c.r) + 0.7152 * channel(c.g) + 0.0722 * channel(c.b)
}

/// `(L_high + 0.05) / (L_low + 0.05)`, symmetric in its arguments.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let (la, lb) = (relative_luminance(a), relative_luminance(b));
    let (high, low) = if la >= lb { (la, lb) } else { (lb, la) };
    (high + 0.05) / (low + 0.05)
}

/// White or black, whichever reads better on `bg`. Ties go to white.
pub fn most_readable_on(bg: Rgb) -> Rgb {
    if contrast_ratio(WHITE, bg) >= contrast_ratio(BLACK, bg) {
        WHITE
    } else {
        BLACK
    }
}

fn ensure_readable(fg: &mut Rgb, bg: Rgb) {
    if contrast_ratio(*fg, bg) < MIN_TEXT_CONTRAST {
        *fg = most_readable_on(bg);
    }
}

/// Replaces unreadable foregrounds in place.
///
/// Text and header are checked first since dim falls back to the adjusted
/// text color.
pub fn enforce(theme: &mut Theme) {
    ensure_readable(&mut theme.text, theme.background);
    ensure_readable(&mut theme.header, theme.background);

    if contrast_ratio(theme.dim, theme.background) < MIN_DIM_CONTRAST {
        theme.dim = theme.text;
    }

    ensure_readable(&mut theme.selection_fg, theme.selection_bg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rgb() -> impl Strategy<Value = Rgb> {
        any::<(u8, u8, u8)>().prop_map(|(r, g, b)| Rgb::new(r, g, b))
    }

    #[test]
    fn black_on_white_is_21() {
        assert!((contrast_ratio(BLACK, WHITE) - 21.0).abs() < 1e-9);
        assert!((contrast_ratio(WHITE, WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn readable_extreme() {
        assert_eq!(most_readable_on(BLACK), WHITE);
        assert_eq!(most_readable_on(WHITE), BLACK);
        assert_eq!(most_readable_on(Rgb::new(250, 240, 200)), BLACK);
    }

    #[test]
    fn low_contrast_text_is_replaced() {
        let mut theme = Theme::default();
        theme.background = Rgb::new(240, 240, 240);
        theme.text = Rgb::new(230, 230, 230);
        theme.header = Rgb::new(10, 10, 10);
        theme.dim = Rgb::new(235, 235, 235);
        enforce(&mut theme);

        assert_eq!(theme.text, BLACK);
        assert_eq!(theme.header, Rgb::new(10, 10, 10));
        assert_eq!(theme.dim, BLACK, "dim falls back to adjusted text");
    }

    #[test]
    fn readable_dim_is_kept() {
        let mut theme = Theme::default();
        theme.background = BLACK;
        theme.dim = Rgb::new(130, 130, 130);
        enforce(&mut theme);
        assert_eq!(theme.dim, Rgb::new(130, 130, 130));
    }

    proptest! {
        #[test]
        fn enforced_themes_are_readable(
            text in rgb(),
            header in rgb(),
            dim in rgb(),
            background in rgb(),
            selection_fg in rgb(),
            selection_bg in rgb(),
        ) {
            let mut theme = Theme {
                text,
                header,
                dim,
                background,
                selection_fg,
                selection_bg,
                ..Theme::default()
            };
            enforce(&mut theme);

            prop_assert!(contrast_ratio(theme.text, theme.background) >= MIN_TEXT_CONTRAST);
            prop_assert!(contrast_ratio(theme.header, theme.background) >= MIN_TEXT_CONTRAST);
            prop_assert!(contrast_ratio(theme.selection_fg, theme.selection_bg) >= MIN_TEXT_CONTRAST);
            prop_assert!(contrast_ratio(theme.dim, theme.background) >= MIN_DIM_CONTRAST);
        }
    }
}
