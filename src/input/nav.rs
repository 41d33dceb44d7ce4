//! Selection and scroll management for the process table.

use crate::state::UiFields;

/// The table as navigation sees it: how many rows exist and how many fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub total: usize,
    pub page_rows: usize,
}

impl Viewport {
    pub fn new(total: usize, page_rows: usize) -> Self {
        Self {
            total,
            page_rows: page_rows.max(1),
        }
    }

    pub fn max_scroll(self) -> usize {
        self.total.saturating_sub(self.page_rows)
    }

    /// Restores the selection/scroll invariant.
    ///
    /// The selection is clamped to the data, the scroll moves the least
    /// amount that keeps the selection visible, then the scroll is clamped to
    /// the data and the selection pulled back onto the page.
    pub fn clamp(self, ui: &mut UiFields) {
        if self.total == 0 {
            ui.selected = 0;
            ui.scroll = 0;
            return;
        }

        let last_row = self.page_rows - 1;
        ui.selected = ui.selected.min(self.total - 1);
        if ui.selected < ui.scroll {
            ui.scroll = ui.selected;
        } else if ui.selected > ui.scroll + last_row {
            ui.scroll = ui.selected - last_row;
        }
        ui.scroll = ui.scroll.min(self.max_scroll());
        ui.selected = ui.selected.clamp(ui.scroll, ui.scroll + last_row);
    }

    /// Moves the selection by `delta` rows.
    pub fn move_by(self, ui: &mut UiFields, delta: isize) {
        ui.selected = ui.selected.saturating_add_signed(delta);
        self.clamp(ui);
    }

    /// Scrolls by `delta` rows and shifts the selection by however far the
    /// window actually moved.
    pub fn scroll_by(self, ui: &mut UiFields, delta: isize) {
        let old = ui.scroll;
        let new = old.saturating_add_signed(delta).min(self.max_scroll());
        let moved = new as isize - old as isize;

        ui.scroll = new;
        ui.selected = ui.selected.saturating_add_signed(moved);
        self.clamp(ui);
    }

    pub fn page_down(self, ui: &mut UiFields) {
        self.scroll_by(ui, self.page_rows as isize);
    }

    pub fn page_up(self, ui: &mut UiFields) {
        self.scroll_by(ui, -(self.page_rows as isize));
    }

    pub fn home(self, ui: &mut UiFields) {
        ui.selected = 0;
        self.clamp(ui);
    }

    pub fn end(self, ui: &mut UiFields) {
        ui.selected = self.total.saturating_sub(1);
        self.clamp(ui);
    }
}
