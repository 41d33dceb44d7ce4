use std::time::Instant;

use sysinfo::{
    MemoryRefreshKind, Networks, Pid, ProcessRefreshKind, ProcessesToUpdate, System, ThreadKind,
    UpdateKind, Users,
};

use super::{
    procfs::{self, DiskSectors, SECTOR_SIZE},
    MetricsProvider, USER_HZ,
};
use crate::types::{CpuTicks, DiskRates, MemoryInfo, NetRates, RawProcess};

/// Collects metrics from the underlying OS.
///
/// sysinfo covers memory, cores, the process list, users, command lines and
/// network interfaces; raw tick counters and disk sectors come from procfs.
pub struct Collector {
    sys: System,
    users: Users,
    networks: Networks,
    last_net: Instant,
    last_disk: Option<(DiskSectors, Instant)>,
}

impl Collector {
    /// Creates a new collector instance.
    pub fn new() -> Self {
        let mut sys = System::new();
        // per-core usage is a delta, so prime the first sample.
        sys.refresh_cpu_usage();
        sys.refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());

        Self {
            sys,
            users: Users::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            last_net: Instant::now(),
            last_disk: None,
        }
    }

    /// Re-reads a single process with the given refresh kind.
    fn refresh_one(&mut self, pid: u32, kind: ProcessRefreshKind) -> Option<&sysinfo::Process> {
        let pid = Pid::from_u32(pid);
        self.sys
            .refresh_processes_specifics(ProcessesToUpdate::Some(&[pid]), false, kind);
        self.sys.process(pid)
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for Collector {
    fn system_cpu_ticks(&mut self) -> Option<CpuTicks> {
        procfs::cpu_ticks()
    }

    fn per_core_cpu_percent(&mut self) -> Vec<f64> {
        self.sys.refresh_cpu_usage();
        self.sys
            .cpus()
            .iter()
            .map(|cpu| f64::from(cpu.cpu_usage()))
            .map(|pct| if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 })
            .collect()
    }

    fn memory_info(&mut self) -> MemoryInfo {
        self.sys
            .refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
        MemoryInfo::from_total_available(self.sys.total_memory(), self.sys.available_memory())
    }

    fn enumerate_processes(&mut self) -> Vec<RawProcess> {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );

        self.sys
            .processes()
            .iter()
            // on linux the tasks of every process come back as entries of
            // their own; kernel threads stay, they have no other row.
            .filter(|(_, process)| process.thread_kind() != Some(ThreadKind::Userland))
            .map(|(pid, process)| {
                let pid = pid.as_u32();
                let stat = procfs::process_stat(pid).unwrap_or_default();
                let name = process.name().to_string_lossy();
                RawProcess {
                    pid,
                    parent_pid: process.parent().map(Pid::as_u32).unwrap_or(0),
                    thread_count: stat.threads,
                    working_set: process.memory(),
                    kernel_ticks: stat.stime,
                    user_ticks: stat.utime,
                    name: (!name.is_empty()).then(|| name.into_owned()),
                }
            })
            .collect()
    }

    fn resolve_process_name(&mut self, pid: u32) -> Option<String> {
        let process = self.refresh_one(
            pid,
            ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet),
        )?;
        process
            .exe()
            .and_then(|exe| exe.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
    }

    fn resolve_process_user(&mut self, pid: u32) -> Option<String> {
        let uid = self
            .refresh_one(
                pid,
                ProcessRefreshKind::nothing().with_user(UpdateKind::OnlyIfNotSet),
            )?
            .user_id()?
            .clone();

        self.users
            .get_user_by_id(&uid)
            .map(|user| user.name().to_owned())
    }

    fn resolve_process_command_line(&mut self, pid: u32) -> Option<String> {
        let process = self.refresh_one(
            pid,
            ProcessRefreshKind::nothing().with_cmd(UpdateKind::OnlyIfNotSet),
        )?;
        let cmd = process
            .cmd()
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        (!cmd.trim().is_empty()).then_some(cmd)
    }

    fn disk_totals(&mut self) -> Option<DiskRates> {
        let now = Instant::now();
        let sectors = procfs::disk_sectors()?;

        let rates = match self.last_disk {
            Some((prev, at)) => {
                let secs = now.duration_since(at).as_secs_f64();
                if secs <= 0.0 {
                    return None;
                }
                let rate = |cur: u64, prev: u64| {
                    (cur.saturating_sub(prev) * SECTOR_SIZE) as f64 / secs
                };
                DiskRates {
                    read_bps: rate(sectors.read, prev.read),
                    write_bps: rate(sectors.written, prev.written),
                }
            }
            None => DiskRates::default(),
        };

        self.last_disk = Some((sectors, now));
        Some(rates)
    }

    fn net_totals(&mut self) -> Option<NetRates> {
        let now = Instant::now();
        self.networks.refresh(true);
        let secs = now.duration_since(self.last_net).as_secs_f64();
        self.last_net = now;

        if self.networks.iter().next().is_none() || secs <= 0.0 {
            return None;
        }

        let (sent, recv) = self
            .networks
            .iter()
            .fold((0u64, 0u64), |(sent, recv), (_name, data)| {
                (sent + data.transmitted(), recv + data.received())
            });

        Some(NetRates {
            sent_bps: sent as f64 / secs,
            recv_bps: recv as f64 / secs,
        })
    }

    fn uptime_secs(&mut self) -> Option<u64> {
        Some(System::uptime())
    }

    fn logical_cores(&self) -> usize {
        match self.sys.cpus().len() {
            0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
            n => n,
        }
    }

    fn ticks_per_second(&self) -> f64 {
        USER_HZ
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::{fs, thread};

    #[test]
    fn threads_are_not_listed_as_processes() {
        let ready = Arc::new(Barrier::new(5));
        let done = Arc::new(Barrier::new(5));
        let workers = (0..4)
            .map(|_| {
                let (ready, done) = (ready.clone(), done.clone());
                thread::spawn(move || {
                    ready.wait();
                    done.wait();
                })
            })
            .collect::<Vec<_>>();
        ready.wait();

        let own = std::process::id();
        let tids = fs::read_dir("/proc/self/task")
            .unwrap()
            .filter_map(|entry| entry.ok()?.file_name().to_str()?.parse::<u32>().ok())
            .filter(|&tid| tid != own)
            .collect::<HashSet<_>>();
        assert!(tids.len() >= 4);

        let rows = Collector::new().enumerate_processes();
        done.wait();
        for worker in workers {
            worker.join().unwrap();
        }

        assert!(rows.iter().any(|row| row.pid == own));
        let leaked = rows.iter().filter(|row| tids.contains(&row.pid)).count();
        assert_eq!(leaked, 0);
    }
}
