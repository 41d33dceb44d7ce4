//! Text formatting helpers for the dashboard.

const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Formats a byte count with binary units.
///
/// Two decimals below 10, one below 100, none above.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let precision = if value >= 100.0 {
        0
    } else if value >= 10.0 {
        1
    } else {
        2
    };
    format!("{value:.precision$} {}", UNITS[unit])
}

/// Formats a throughput in bytes per second.
pub fn format_rate(bytes_per_sec: f64) -> String {
    let bytes = if bytes_per_sec.is_finite() {
        bytes_per_sec.max(0.0).round() as u64
    } else {
        0
    };
    format!("{}/s", format_bytes(bytes))
}

/// Formats an uptime as days, hours and minutes.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs / 3_600) % 24;
    let minutes = (secs / 60) % 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes:02}m")
    } else {
        format!("{hours}h {minutes:02}m")
    }
}

/// Pads with spaces or cuts to exactly `width` characters.
pub fn pad_right(s: &str, width: usize) -> String {
    let mut out = s.chars().take(width).collect::<String>();
    let len = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - len));
    out
}

/// Right-aligns `s` in `width` characters, cutting from the right if needed.
pub fn pad_left(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.chars().take(width).collect();
    }
    format!("{}{s}", " ".repeat(width - len))
}

/// Fits `s` into `width` characters, marking a cut end with `…`.
pub fn ellipsis(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len <= width {
        return pad_right(s, width);
    }
    if width <= 1 {
        return s.chars().take(width).collect();
    }

    let mut out = s.chars().take(width - 1).collect::<String>();
    out.push('…');
    out
}

/// Fits `s` into `width` characters, keeping both ends around a `…`.
///
/// Used for paths and command lines where the tail is as telling as the head.
pub fn middle_ellipsis(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len <= width {
        return pad_right(s, width);
    }
    if width <= 1 {
        return s.chars().take(width).collect();
    }

    let left = (width - 1) / 2;
    let right = width - 1 - left;
    let mut out = s.chars().take(left).collect::<String>();
    out.push('…');
    out.extend(s.chars().skip(len - right));
    out
}
