//! Process table columns, sorting and row text.

use std::cmp::Ordering;

use crate::types::{ProcessRecord, SortMode};

use super::format::{ellipsis, format_bytes, middle_ellipsis, pad_left, pad_right};

pub const PID_WIDTH: usize = 5;
pub const THREADS_WIDTH: usize = 7;
pub const MEM_WIDTH: usize = 11;
pub const CPU_WIDTH: usize = 6;

pub const NAME_MIN: usize = 10;
pub const USER_MIN: usize = 10;
pub const COMMAND_MIN: usize = 15;

const FIXED: usize = PID_WIDTH + THREADS_WIDTH + MEM_WIDTH + CPU_WIDTH;

/// Widths of the flexible columns for a given table width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Columns {
    pub name: usize,
    /// `None` when the command column does not fit.
    pub command: Option<usize>,
    pub user: usize,
}

/// The role of a cell, which decides its color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Pid,
    Name,
    Command,
    Threads,
    User,
    Memory,
    Cpu,
}

impl Columns {
    /// Splits `width` (the inside of the table box) between the columns.
    pub fn fit(width: usize) -> Self {
        let flex_with_command = width.saturating_sub(FIXED + 6);
        if flex_with_command >= NAME_MIN + USER_MIN + COMMAND_MIN {
            return Self::with_command(flex_with_command);
        }

        let flex = width.saturating_sub(FIXED + 5);
        let name = NAME_MIN.max(flex / 2);
        let mut user = USER_MIN.max(flex.saturating_sub(name));
        if name + user > flex {
            user = flex.saturating_sub(name);
        }
        Self {
            name,
            command: None,
            user,
        }
    }

    fn with_command(flex: usize) -> Self {
        let mut name = NAME_MIN.max(flex / 5);
        let mut command = COMMAND_MIN.max(flex * 3 / 5);
        let mut user = USER_MIN.max(flex.saturating_sub(name + command));

        // overflow comes out of user first, then command, then name.
        let mut over = (name + command + user).saturating_sub(flex);
        let cut = over.min(user - USER_MIN);
        user -= cut;
        over -= cut;
        let cut = over.min(command - COMMAND_MIN);
        command -= cut;
        over -= cut;
        name = name.saturating_sub(over);

        Self {
            name,
            command: Some(command),
            user,
        }
    }

    /// The header row.
    pub fn header(&self) -> Vec<(Cell, String)> {
        let mut cells = vec![
            (Cell::Pid, pad_left("Pid", PID_WIDTH)),
            (Cell::Name, pad_right("Program", self.name)),
        ];
        if let Some(width) = self.command {
            cells.push((Cell::Command, pad_right("Command", width)));
        }
        cells.extend([
            (Cell::Threads, pad_right("Threads", THREADS_WIDTH)),
            (Cell::User, pad_right("User", self.user)),
            (Cell::Memory, pad_right("MemB", MEM_WIDTH)),
            (Cell::Cpu, pad_right("Cpu%", CPU_WIDTH)),
        ]);
        cells
    }

    /// One process row, every cell already fitted to its width.
    pub fn row(&self, p: &ProcessRecord) -> Vec<(Cell, String)> {
        let mut cells = vec![
            (Cell::Pid, pad_left(&p.pid.to_string(), PID_WIDTH)),
            (Cell::Name, ellipsis(&p.name, self.name)),
        ];
        if let Some(width) = self.command {
            let command = p
                .command
                .as_deref()
                .filter(|cmd| !cmd.is_empty())
                .unwrap_or(p.name.as_str());
            cells.push((Cell::Command, middle_ellipsis(command, width)));
        }
        cells.extend([
            (Cell::Threads, pad_left(&p.threads.to_string(), THREADS_WIDTH)),
            (Cell::User, ellipsis(p.user.as_deref().unwrap_or(""), self.user)),
            (Cell::Memory, pad_right(&format_bytes(p.working_set), MEM_WIDTH)),
            (Cell::Cpu, pad_left(&format!("{:.1}", p.cpu_percent), CPU_WIDTH)),
        ]);
        cells
    }
}

/// Orders the rows for display.
///
/// Working set and cpu sort descending, pid and name ascending; ties fall
/// back to the pid so rows do not jitter between frames.
pub fn sorted(processes: &[ProcessRecord], mode: SortMode) -> Vec<&ProcessRecord> {
    let mut rows = processes.iter().collect::<Vec<_>>();
    let by_pid = |a: &&ProcessRecord, b: &&ProcessRecord| a.pid.cmp(&b.pid);
    let order = |a: &&ProcessRecord, b: &&ProcessRecord| -> Ordering {
        match mode {
            SortMode::WorkingSet => b.working_set.cmp(&a.working_set),
            SortMode::Cpu => b.cpu_percent.total_cmp(&a.cpu_percent),
            SortMode::Pid => Ordering::Equal,
            SortMode::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        }
    };
    rows.sort_by(|a, b| order(a, b).then_with(|| by_pid(a, b)));
    rows
}
