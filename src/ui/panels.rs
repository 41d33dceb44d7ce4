//! The base frame: header, cpu and memory panels, process table and footer.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Widget};

use super::format::{ellipsis, format_bytes, format_rate, format_uptime};
use super::sparkline;
use super::table::{self, Cell, Columns};
use crate::input::nav::Viewport;
use crate::state::{UiFields, View};
use crate::theme::{Rgb, Theme};

/// Cells of the disk and network sparklines.
pub const SPARK_CELLS: usize = 24;

/// Width of one per-core meter.
const CORE_METER: u16 = 12;
/// Horizontal distance between per-core columns.
const CORE_COLUMN: u16 = 18;

/// Writes `line` at row `dy` and column `dx` of `area`, clipped to it.
pub(crate) fn put(buf: &mut Buffer, area: Rect, dx: u16, dy: u16, line: &Line<'_>) {
    let area = area.intersection(buf.area);
    if dy >= area.height || dx >= area.width {
        return;
    }
    buf.set_line(area.x + dx, area.y + dy, line, area.width - dx);
}

/// Paints a whole row of `area` with `style`.
pub(crate) fn fill_row(buf: &mut Buffer, area: Rect, dy: u16, style: Style) {
    if dy < area.height {
        buf.set_style(Rect::new(area.x, area.y + dy, area.width, 1).intersection(buf.area), style);
    }
}

/// A bordered box in the theme's frame color with a colored title.
pub(crate) fn framed(buf: &mut Buffer, area: Rect, title: &str, title_color: Rgb, theme: &Theme) -> Rect {
    let area = area.intersection(buf.area);
    if area.is_empty() {
        return area;
    }
    let block = Block::bordered()
        .title(Line::from(title.to_owned()).fg(title_color))
        .border_style(Style::new().fg(theme.frame.into()))
        .style(Style::new().bg(theme.overlay.into()));
    let inner = block.inner(area);
    block.render(area, buf);
    inner
}

/// A horizontal bar whose fill blends from the low to the high bar color.
pub fn meter(buf: &mut Buffer, x: u16, y: u16, width: u16, percent: f64, theme: &Theme) {
    let percent = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
    let filled = (percent / 100.0 * f64::from(width)).round() as u16;

    for i in 0..width {
        let bg = if i < filled {
            let k = if filled <= 1 {
                1.0
            } else {
                f64::from(i) / f64::from(filled - 1)
            };
            theme.bar_low.lerp(theme.bar_high, k)
        } else {
            theme.meter_bg
        };
        if let Some(cell) = buf.cell_mut((x.saturating_add(i), y)) {
            cell.set_char(' ').set_bg(bg.into());
        }
    }
}

pub fn header(buf: &mut Buffer, area: Rect, theme: &Theme, host: &str, uptime: Option<u64>, clock: &str, hz: u32) {
    let style = Style::new().fg(theme.header.into()).bg(theme.panel.into());
    fill_row(buf, area, 0, style);

    let mut left = vec![Span::styled(" restop", style.bold()), Span::styled(format!(" · {host}"), style)];
    if let Some(secs) = uptime {
        left.push(Span::styled(format!(" · up {}", format_uptime(secs)), style));
    }
    put(buf, area, 0, 0, &Line::from(left));

    let right = format!("{clock} · {hz} Hz ");
    let width = right.chars().count() as u16;
    if width < area.width {
        put(buf, area, area.width - width, 0, &Line::styled(right, style));
    }
}

pub fn cpu(buf: &mut Buffer, area: Rect, theme: &Theme, view: &View, hz: u32) {
    let inner = framed(buf, area, " CPU ", theme.box_cpu, theme);
    let text = Style::new().fg(theme.text.into());
    let usage = view.snapshot.cpu_percent;

    put(buf, inner, 1, 0, &Line::styled(format!("Usage: {usage:.1}%   ({hz} Hz)"), text));
    if inner.height > 1 {
        meter(buf, inner.x + 1, inner.y + 1, inner.width.saturating_sub(2), usage, theme);
    }

    // per-core grid from the fourth inner row down.
    let per_row = (inner.width.saturating_sub(4) / CORE_COLUMN).max(1) as usize;
    for (i, &pct) in view.snapshot.per_core.iter().enumerate() {
        let dy = 3 + (i / per_row) as u16;
        if dy >= inner.height {
            break;
        }
        let dx = 1 + (i % per_row) as u16 * CORE_COLUMN;
        put(buf, inner, dx, dy, &Line::styled(format!("C{i}: "), text));
        if dx + 4 < inner.width {
            let width = CORE_METER.min(inner.width - dx - 4);
            meter(buf, inner.x + dx + 4, inner.y + dy, width, pct, theme);
        }
    }
}

/// A rate line followed by its sparkline when there is room for both.
fn with_spark(line: String, spark: &str, width: usize) -> String {
    if width <= 12 || spark.is_empty() {
        return line;
    }
    let max_text = width.saturating_sub(2 + spark.chars().count());
    let text = if line.chars().count() > max_text {
        ellipsis(&line, max_text)
    } else {
        line
    };
    format!("{text}  {spark}")
}

pub fn disk_line(view: &View) -> String {
    match view.snapshot.disk {
        Some(disk) => format!("disk: R {} | W {}", format_rate(disk.read_bps), format_rate(disk.write_bps)),
        None => "disk: — | —".to_owned(),
    }
}

pub fn net_line(view: &View) -> String {
    match view.snapshot.net {
        Some(net) => format!("net : ↑ {} | ↓ {}", format_rate(net.sent_bps), format_rate(net.recv_bps)),
        None => "net : — | —".to_owned(),
    }
}

pub fn memory(buf: &mut Buffer, area: Rect, theme: &Theme, view: &View) {
    let inner = framed(buf, area, " Memory ", theme.box_mem, theme);
    let text = Style::new().fg(theme.text.into());
    let mem = &view.snapshot.memory;

    put(buf, inner, 1, 0, &Line::styled(format!("Total: {}", format_bytes(mem.total)), text));
    put(buf, inner, 1, 1, &Line::styled(format!("Used : {}", format_bytes(mem.used)), text));
    put(buf, inner, 1, 2, &Line::styled(format!("Avail: {}", format_bytes(mem.available)), text));
    if inner.height > 3 {
        meter(buf, inner.x + 1, inner.y + 3, inner.width.saturating_sub(2), mem.percent, theme);
    }

    let width = usize::from(inner.width.saturating_sub(2));
    let disk_spark = match view.snapshot.disk {
        Some(_) => sparkline::braille(&view.disk_read_history, SPARK_CELLS),
        None => String::new(),
    };
    let net_spark = match view.snapshot.net {
        Some(_) => sparkline::braille(&view.net_up_history, SPARK_CELLS),
        None => String::new(),
    };
    put(buf, inner, 1, 4, &Line::styled(with_spark(disk_line(view), &disk_spark, width), text));
    put(buf, inner, 1, 5, &Line::styled(with_spark(net_line(view), &net_spark, width), text));
}

fn cell_color(cell: Cell, cpu: f64, theme: &Theme) -> Rgb {
    match cell {
        Cell::Pid | Cell::Threads => theme.header,
        Cell::Name => theme.text,
        Cell::Command | Cell::User => theme.dim,
        Cell::Memory => theme.bar_high,
        Cell::Cpu => theme.level(cpu),
    }
}

fn row_line(cells: Vec<(Cell, String)>, color: impl Fn(Cell) -> Option<Rgb>) -> Line<'static> {
    let mut spans = Vec::with_capacity(cells.len() * 2);
    for (i, (cell, text)) in cells.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(match color(cell) {
            Some(fg) => Span::styled(text, Style::new().fg(fg.into())),
            None => Span::raw(text),
        });
    }
    Line::from(spans)
}

pub fn processes(buf: &mut Buffer, area: Rect, theme: &Theme, view: &View, ui: &UiFields, page_rows: usize) {
    let title = format!(" Top processes · sort: {} ", ui.sort.label());
    let inner = framed(buf, area, &title, theme.box_proc, theme);
    let columns = Columns::fit(usize::from(inner.width));

    let header = row_line(columns.header(), |_| Some(theme.header));
    put(buf, inner, 0, 0, &header.bold());

    let rows = table::sorted(&view.snapshot.processes, ui.sort);
    let first = ui.scroll.min(Viewport::new(rows.len(), page_rows).max_scroll());
    let visible = page_rows.min(usize::from(inner.height.saturating_sub(1)));

    for (offset, process) in rows.iter().skip(first).take(visible).enumerate() {
        let dy = 1 + offset as u16;
        let cells = columns.row(process);
        if first + offset == ui.selected {
            fill_row(buf, inner, dy, theme.selection_style());
            put(buf, inner, 0, dy, &row_line(cells, |_| None).style(theme.selection_style()));
        } else {
            let cpu = process.cpu_percent;
            put(buf, inner, 0, dy, &row_line(cells, |cell| Some(cell_color(cell, cpu, theme))));
        }
    }
}

pub fn footer(buf: &mut Buffer, area: Rect, theme: &Theme) {
    const HINTS: [(&str, &str); 9] = [
        ("Q", "quit"),
        ("F1", "cpu%"),
        ("F2", "mem"),
        ("F3", "pid"),
        ("F6", "name"),
        ("F5", "Hz"),
        ("PgUp/PgDn", "scroll"),
        ("Esc/M", "menu"),
        ("H", "help"),
    ];

    fill_row(buf, area, 0, Style::new().bg(theme.background.into()));
    let spans = HINTS.iter().flat_map(|(key, label)| {
        [
            Span::styled(format!("{key} "), theme.dim_style()),
            Span::styled(format!("{label}  "), theme.accent_style()),
        ]
    });
    put(buf, area, 1, 0, &Line::from(spans.collect::<Vec<_>>()));
}
