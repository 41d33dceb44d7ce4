//! Sources of raw operating system metrics.
//!
//! The sampler only ever talks to a [`MetricsProvider`]. Failures inside a
//! provider are swallowed and surface as empty or absent values, so a
//! misbehaving platform API can degrade the dashboard but never stop it.

use crate::types::{CpuTicks, DiskRates, MemoryInfo, NetRates, RawProcess};

mod procfs;
mod system;

pub use self::procfs::USER_HZ;
pub use self::system::Collector;

/// Raw counters consumed by the sampler.
///
/// Every method is called from the sampler thread only.
pub trait MetricsProvider {
    /// Cumulative system-wide cpu ticks, `None` if they could not be read.
    fn system_cpu_ticks(&mut self) -> Option<CpuTicks>;

    /// Busy percentage of each logical core; empty on failure.
    fn per_core_cpu_percent(&mut self) -> Vec<f64>;

    fn memory_info(&mut self) -> MemoryInfo;

    fn enumerate_processes(&mut self) -> Vec<RawProcess>;

    /// Resolves a display name for a process whose enumeration entry had none.
    fn resolve_process_name(&mut self, _pid: u32) -> Option<String> {
        None
    }

    fn resolve_process_user(&mut self, pid: u32) -> Option<String>;

    fn resolve_process_command_line(&mut self, pid: u32) -> Option<String>;

    fn disk_totals(&mut self) -> Option<DiskRates>;

    fn net_totals(&mut self) -> Option<NetRates>;

    /// Seconds since boot, if known.
    fn uptime_secs(&mut self) -> Option<u64> {
        None
    }

    /// Number of logical cores, used to normalize per-process cpu time.
    fn logical_cores(&self) -> usize;

    /// How many process ticks make up one second of cpu time.
    fn ticks_per_second(&self) -> f64;
}

impl<P: MetricsProvider + ?Sized> MetricsProvider for Box<P> {
    fn system_cpu_ticks(&mut self) -> Option<CpuTicks> {
        (**self).system_cpu_ticks()
    }

    fn per_core_cpu_percent(&mut self) -> Vec<f64> {
        (**self).per_core_cpu_percent()
    }

    fn memory_info(&mut self) -> MemoryInfo {
        (**self).memory_info()
    }

    fn enumerate_processes(&mut self) -> Vec<RawProcess> {
        (**self).enumerate_processes()
    }

    fn resolve_process_name(&mut self, pid: u32) -> Option<String> {
        (**self).resolve_process_name(pid)
    }

    fn resolve_process_user(&mut self, pid: u32) -> Option<String> {
        (**self).resolve_process_user(pid)
    }

    fn resolve_process_command_line(&mut self, pid: u32) -> Option<String> {
        (**self).resolve_process_command_line(pid)
    }

    fn disk_totals(&mut self) -> Option<DiskRates> {
        (**self).disk_totals()
    }

    fn net_totals(&mut self) -> Option<NetRates> {
        (**self).net_totals()
    }

    fn uptime_secs(&mut self) -> Option<u64> {
        (**self).uptime_secs()
    }

    fn logical_cores(&self) -> usize {
        (**self).logical_cores()
    }

    fn ticks_per_second(&self) -> f64 {
        (**self).ticks_per_second()
    }
}
