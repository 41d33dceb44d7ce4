//! Plain data shared between the sampler, the shared state and the renderer.

/// Cumulative system-wide cpu time counters.
///
/// `kernel` includes `idle`, so busy time is `(kernel - idle) + user`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTicks {
    pub idle: u64,
    pub kernel: u64,
    pub user: u64,
}

/// Physical memory totals, in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MemoryInfo {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub percent: f64,
}

/// A process as reported by the raw enumeration, before enrichment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawProcess {
    pub pid: u32,
    pub parent_pid: u32,
    pub thread_count: u32,
    pub working_set: u64,
    pub kernel_ticks: u64,
    pub user_ticks: u64,
    /// Best-effort image name; `None` when the enumeration could not see it.
    pub name: Option<String>,
}

/// A process row in a published snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub user: Option<String>,
    pub command: Option<String>,
    pub working_set: u64,
    pub threads: u32,
    pub cpu_percent: f64,
}

/// Aggregate disk throughput.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiskRates {
    pub read_bps: f64,
    pub write_bps: f64,
}

/// Aggregate network throughput.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NetRates {
    pub sent_bps: f64,
    pub recv_bps: f64,
}

/// One sampling tick worth of metrics.
///
/// Built by the sampler off-lock and published whole; never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricSnapshot {
    pub cpu_percent: f64,
    pub per_core: Vec<f64>,
    pub memory: MemoryInfo,
    /// Ordered by working set, largest first.
    pub processes: Vec<ProcessRecord>,
    pub disk: Option<DiskRates>,
    pub net: Option<NetRates>,
    pub uptime_secs: Option<u64>,
}

/// Sorting criteria for the process table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    WorkingSet,
    Cpu,
    Pid,
    Name,
}

/// The dashboard's modal state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UiMode {
    #[default]
    Normal,
    MainMenu,
    ThemePicker,
    Help,
}

// === impl CpuTicks ===

impl CpuTicks {
    /// Returns the busy percentage of the interval between `prev` and `self`.
    pub fn usage_since(&self, prev: &CpuTicks) -> f64 {
        let idle = self.idle as f64 - prev.idle as f64;
        let kernel = self.kernel as f64 - prev.kernel as f64;
        let user = self.user as f64 - prev.user as f64;

        let busy = (kernel - idle) + user;
        let total = busy + idle;
        if total <= 0.0 {
            return 0.0;
        }

        (busy / total * 100.0).clamp(0.0, 100.0)
    }
}

// === impl MemoryInfo ===

impl MemoryInfo {
    /// Derives `used` and `percent` from a total and an available figure.
    pub fn from_total_available(total: u64, available: u64) -> Self {
        let available = available.min(total);
        let used = total - available;
        let percent = if total == 0 {
            0.0
        } else {
            used as f64 / total as f64 * 100.0
        };

        Self {
            total,
            available,
            used,
            percent,
        }
    }
}

// === impl SortMode ===

impl SortMode {
    pub fn label(self) -> &'static str {
        match self {
            SortMode::WorkingSet => "mem",
            SortMode::Cpu => "cpu%",
            SortMode::Pid => "pid",
            SortMode::Name => "name",
        }
    }
}

impl UiMode {
    /// Whether an overlay is drawn on top of the base frame.
    pub fn is_modal(self) -> bool {
        !matches!(self, UiMode::Normal)
    }
}
