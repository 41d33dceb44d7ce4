//! The one structure the sampler and the ui thread share.
//!
//! Both sides hold the lock only to copy complete field sets in or out. The
//! snapshot is published by replacement behind an [`Arc`], so readers take a
//! reference instead of a deep copy and can never observe half a tick.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::history::RingBuffer;
use crate::types::{MetricSnapshot, SortMode, UiMode};

/// The handle both threads hold.
pub type Shared = Arc<Mutex<SharedState>>;

/// Refresh rate used when nothing else was configured.
pub const DEFAULT_HZ: u32 = 5;

/// Ui-facing fields, copied out and written back as one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiFields {
    pub mode: UiMode,
    pub menu_index: usize,
    /// Sampling rate in samples per second; never below 1.
    pub hz: u32,
    pub sort: SortMode,
    pub scroll: usize,
    pub selected: usize,
}

#[derive(Debug)]
pub struct SharedState {
    pub snapshot: Arc<MetricSnapshot>,
    pub cpu_history: RingBuffer<f64>,
    pub mem_history: RingBuffer<f64>,
    pub disk_read_history: RingBuffer<f64>,
    pub net_up_history: RingBuffer<f64>,
    pub ui: UiFields,
}

/// Everything the renderer needs from the shared state for one base frame.
#[derive(Clone, Debug)]
pub struct View {
    pub snapshot: Arc<MetricSnapshot>,
    pub cpu_history: Vec<f64>,
    pub mem_history: Vec<f64>,
    pub disk_read_history: Vec<f64>,
    pub net_up_history: Vec<f64>,
}

// === impl UiFields ===

impl UiFields {
    pub fn with_hz(hz: u32) -> Self {
        Self {
            hz: hz.max(1),
            ..Self::default()
        }
    }
}

impl Default for UiFields {
    fn default() -> Self {
        Self {
            mode: UiMode::Normal,
            menu_index: 0,
            hz: DEFAULT_HZ,
            sort: SortMode::default(),
            scroll: 0,
            selected: 0,
        }
    }
}

// === impl SharedState ===

impl SharedState {
    pub fn new(hz: u32) -> Self {
        Self {
            snapshot: Arc::default(),
            cpu_history: RingBuffer::default(),
            mem_history: RingBuffer::default(),
            disk_read_history: RingBuffer::default(),
            net_up_history: RingBuffer::default(),
            ui: UiFields::with_hz(hz),
        }
    }

    /// Wraps a fresh state in the shared handle.
    pub fn shared(hz: u32) -> Shared {
        Arc::new(Mutex::new(Self::new(hz)))
    }

    /// Replaces the snapshot and appends its headline values to the histories.
    pub fn publish(&mut self, snapshot: MetricSnapshot) {
        self.cpu_history.push(snapshot.cpu_percent);
        self.mem_history.push(snapshot.memory.percent);
        if let Some(disk) = snapshot.disk {
            self.disk_read_history.push(disk.read_bps);
        }
        if let Some(net) = snapshot.net {
            self.net_up_history.push(net.sent_bps);
        }
        self.snapshot = Arc::new(snapshot);
    }

    /// The sampling rate, clamped to at least one tick per second.
    pub fn hz(&self) -> u32 {
        self.ui.hz.max(1)
    }

    pub fn process_count(&self) -> usize {
        self.snapshot.processes.len()
    }

    /// Copies out what a base frame needs.
    pub fn view(&self) -> View {
        View {
            snapshot: Arc::clone(&self.snapshot),
            cpu_history: self.cpu_history.to_vec(),
            mem_history: self.mem_history.to_vec(),
            disk_read_history: self.disk_read_history.to_vec(),
            net_up_history: self.net_up_history.to_vec(),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(DEFAULT_HZ)
    }
}
