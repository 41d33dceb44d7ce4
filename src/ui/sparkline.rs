//! Braille sparklines: two samples per glyph, four levels each.

/// Dots of the left braille column, bottom to top.
const LEFT_DOTS: [u32; 4] = [0x40, 0x04, 0x02, 0x01];
/// Dots of the right braille column, bottom to top.
const RIGHT_DOTS: [u32; 4] = [0x80, 0x20, 0x10, 0x08];

const BRAILLE_BASE: u32 = 0x2800;

/// Compresses the most recent `cells * 2` values into `cells` glyphs.
///
/// Values are normalized over the visible window only, so the chart always
/// spans its full height. A window shorter than the chart leaves the trailing
/// cells at the minimum level.
pub fn braille(values: &[f64], cells: usize) -> String {
    if values.is_empty() || cells == 0 {
        return String::new();
    }

    let window = &values[values.len().saturating_sub(cells * 2)..];
    let min = window.iter().copied().fold(f64::INFINITY, f64::min);
    let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = match max - min {
        span if span.is_finite() && span >= 1e-9 => span,
        _ => 1.0,
    };

    let level = |v: f64| {
        let norm = ((v - min) / span).clamp(0.0, 1.0);
        if norm.is_nan() {
            0
        } else {
            (norm * 3.0).round() as usize
        }
    };
    let column = |dots: &[u32; 4], level: usize| -> u32 { dots[..=level.min(3)].iter().sum() };

    let mut samples = window.iter().copied();
    (0..cells)
        .map(|_| {
            let left = samples.next().unwrap_or(min);
            let right = samples.next().unwrap_or(min);
            let mask = column(&LEFT_DOTS, level(left)) | column(&RIGHT_DOTS, level(right));
            char::from_u32(BRAILLE_BASE + mask).unwrap_or(' ')
        })
        .collect()
}
