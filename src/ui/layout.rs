//! Screen geometry, recomputed from the terminal size on every cycle.

use ratatui::layout::Rect;

/// Height of the cpu and memory panels, borders included.
pub const PANEL_HEIGHT: u16 = 8;

/// Narrowest panel before the two panels are stacked.
pub const MIN_PANEL_WIDTH: u16 = 40;

/// Space between the side-by-side panels.
const GAP: u16 = 1;

/// Rows of the table box that hold no process: both borders and the column header.
const TABLE_CHROME: u16 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub header: Rect,
    pub cpu: Rect,
    pub memory: Rect,
    /// The process table box, borders included.
    pub table: Rect,
    pub footer: Rect,
    /// Whether the panels are stacked instead of side by side.
    pub stacked: bool,
    /// Process rows that fit in the table.
    pub page_rows: usize,
}

impl Layout {
    pub fn compute(area: Rect) -> Self {
        let rows = area.height;
        // one column of margin on each side.
        let content_x = area.x.saturating_add(1);
        let content_w = area.width.saturating_sub(2);

        let header = Rect::new(area.x, area.y, area.width, rows.min(1));
        let panels_top = area.y.saturating_add(1);

        let half = content_w.saturating_sub(GAP) / 2;
        let stacked = half < MIN_PANEL_WIDTH;
        let (cpu, memory) = if stacked {
            (
                Rect::new(content_x, panels_top, content_w, PANEL_HEIGHT),
                Rect::new(
                    content_x,
                    panels_top.saturating_add(PANEL_HEIGHT),
                    content_w,
                    PANEL_HEIGHT,
                ),
            )
        } else {
            let right_w = content_w - GAP - half;
            (
                Rect::new(content_x, panels_top, half, PANEL_HEIGHT),
                Rect::new(content_x + half + GAP, panels_top, right_w, PANEL_HEIGHT),
            )
        };

        let table_top = memory.bottom();
        let footer_y = area.bottom().saturating_sub(1);
        let table = Rect::new(
            content_x,
            table_top,
            content_w,
            footer_y.saturating_sub(table_top),
        );
        let footer = Rect::new(area.x, footer_y, area.width, rows.min(1));

        // clip everything to the terminal so tiny windows never draw outside it.
        let clip = |r: Rect| r.intersection(area);
        Self {
            header: clip(header),
            cpu: clip(cpu),
            memory: clip(memory),
            table: clip(table),
            footer: clip(footer),
            stacked,
            page_rows: usize::from(table.height.saturating_sub(TABLE_CHROME)).max(1),
        }
    }
}
