//! The background sampling loop.
//!
//! Each tick queries the [`MetricsProvider`], turns raw counters into a
//! [`MetricSnapshot`] without holding any lock, then publishes it into the
//! shared state in a single critical section.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::collector::MetricsProvider;
use crate::errors::{Error, Result};
use crate::state::Shared;
use crate::types::{CpuTicks, MetricSnapshot, ProcessRecord};

/// How many of the largest processes get user and command line resolution.
pub const ENRICH_LIMIT: usize = 120;

/// Upper bound for a single process' cpu percentage.
pub const MAX_PROCESS_CPU: f64 = 999.9;

/// Shown when a process name cannot be resolved.
const UNKNOWN_NAME: &str = "?";

pub struct Sampler<P> {
    provider: P,
    prev_system: Option<CpuTicks>,
    /// Previous `kernel + user` ticks per pid.
    prev_ticks: HashMap<u32, u64>,
    names: HashMap<u32, String>,
    users: HashMap<u32, String>,
    commands: HashMap<u32, String>,
}

impl<P: MetricsProvider> Sampler<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            prev_system: None,
            prev_ticks: HashMap::new(),
            names: HashMap::new(),
            users: HashMap::new(),
            commands: HashMap::new(),
        }
    }

    /// Produces one snapshot.
    ///
    /// `elapsed` is the wall time since the previous tick and scales the
    /// per-process cpu deltas.
    pub fn tick(&mut self, elapsed: Duration) -> MetricSnapshot {
        let cpu_percent = match self.provider.system_cpu_ticks() {
            Some(ticks) => {
                let usage = self
                    .prev_system
                    .map_or(0.0, |prev| ticks.usage_since(&prev));
                self.prev_system = Some(ticks);
                usage
            }
            None => 0.0,
        };
        let memory = self.provider.memory_info();
        let per_core = self.provider.per_core_cpu_percent();
        let mut raw = self.provider.enumerate_processes();

        // enrichment eligibility is ranked by working set, whatever the table
        // is currently sorted by.
        raw.sort_by(|a, b| {
            b.working_set
                .cmp(&a.working_set)
                .then_with(|| a.pid.cmp(&b.pid))
        });

        let cores = self.provider.logical_cores().max(1) as f64;
        let budget = elapsed.as_secs_f64() * self.provider.ticks_per_second() * cores;

        let mut next_ticks = HashMap::with_capacity(raw.len());
        let mut processes = Vec::with_capacity(raw.len());
        for (rank, process) in raw.into_iter().enumerate() {
            let total = process.kernel_ticks.saturating_add(process.user_ticks);
            let cpu_percent = match self.prev_ticks.get(&process.pid) {
                Some(&prev) if budget > 0.0 => {
                    let delta = total.saturating_sub(prev) as f64;
                    (delta / budget * 100.0).clamp(0.0, MAX_PROCESS_CPU)
                }
                _ => 0.0,
            };
            next_ticks.insert(process.pid, total);

            let eligible = rank < ENRICH_LIMIT;
            let name = match process.name.filter(|name| !name.is_empty()) {
                Some(name) => name,
                None => self.name_of(process.pid, eligible),
            };
            let user = self.user_of(process.pid, eligible);
            let command = self.command_of(process.pid, eligible);

            processes.push(ProcessRecord {
                pid: process.pid,
                name,
                user,
                command,
                working_set: process.working_set,
                threads: process.thread_count,
                cpu_percent,
            });
        }

        self.prev_ticks = next_ticks;
        let live = &self.prev_ticks;
        self.names.retain(|pid, _| live.contains_key(pid));
        self.users.retain(|pid, _| live.contains_key(pid));
        self.commands.retain(|pid, _| live.contains_key(pid));

        MetricSnapshot {
            cpu_percent,
            per_core,
            memory,
            processes,
            disk: self.provider.disk_totals(),
            net: self.provider.net_totals(),
            uptime_secs: self.provider.uptime_secs(),
        }
    }

    /// Samples until `shutdown` is set, publishing every tick into `state`.
    ///
    /// The rate is re-read from the shared state on every iteration, so a
    /// change applies from the next tick on.
    pub fn run(mut self, state: Shared, shutdown: Arc<AtomicBool>) {
        info!("sampler started");
        let mut last_tick: Option<Instant> = None;

        while !shutdown.load(Ordering::Acquire) {
            let started = Instant::now();
            let hz = state.lock().hz();
            let period = Duration::from_secs_f64(1.0 / f64::from(hz));
            let elapsed = last_tick.map_or(period, |at| started.duration_since(at));
            last_tick = Some(started);

            let snapshot = self.tick(elapsed);
            debug!(
                cpu = snapshot.cpu_percent,
                mem = snapshot.memory.percent,
                processes = snapshot.processes.len(),
                hz,
                "tick"
            );
            state.lock().publish(snapshot);

            if let Some(rest) = period.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }

        drop(self.provider);
        info!("sampler stopped, provider released");
    }

    fn name_of(&mut self, pid: u32, eligible: bool) -> String {
        if let Some(name) = self.names.get(&pid) {
            return name.clone();
        }
        if eligible {
            if let Some(name) = self.provider.resolve_process_name(pid) {
                self.names.insert(pid, name.clone());
                return name;
            }
        }
        UNKNOWN_NAME.to_owned()
    }

    fn user_of(&mut self, pid: u32, eligible: bool) -> Option<String> {
        if let Some(user) = self.users.get(&pid) {
            return Some(user.clone());
        }
        if !eligible {
            return None;
        }
        // failures are not cached so the lookup is retried next tick.
        let user = self.provider.resolve_process_user(pid)?;
        self.users.insert(pid, user.clone());
        Some(user)
    }

    fn command_of(&mut self, pid: u32, eligible: bool) -> Option<String> {
        if let Some(cmd) = self.commands.get(&pid) {
            return Some(cmd.clone());
        }
        if !eligible {
            return None;
        }
        let cmd = self.provider.resolve_process_command_line(pid)?;
        self.commands.insert(pid, cmd.clone());
        Some(cmd)
    }
}

impl<P: MetricsProvider + Send + 'static> Sampler<P> {
    /// Starts the sampling loop on its own thread.
    pub fn spawn(self, state: Shared, shutdown: Arc<AtomicBool>) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("sampler".into())
            .spawn(move || self.run(state, shutdown))
            .map_err(Error::Spawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiskRates, MemoryInfo, NetRates, RawProcess};
    use std::collections::HashSet;

    #[derive(Default)]
    struct Mock {
        ticks: Option<CpuTicks>,
        processes: Vec<RawProcess>,
        cores: usize,
        failing_users: HashSet<u32>,
        user_calls: Vec<u32>,
        command_calls: Vec<u32>,
        name_calls: Vec<u32>,
    }

    impl MetricsProvider for Mock {
        fn system_cpu_ticks(&mut self) -> Option<CpuTicks> {
            self.ticks
        }

        fn per_core_cpu_percent(&mut self) -> Vec<f64> {
            vec![10.0; self.cores]
        }

        fn memory_info(&mut self) -> MemoryInfo {
            MemoryInfo::from_total_available(1000, 500)
        }

        fn enumerate_processes(&mut self) -> Vec<RawProcess> {
            self.processes.clone()
        }

        fn resolve_process_name(&mut self, pid: u32) -> Option<String> {
            self.name_calls.push(pid);
            Some(format!("proc{pid}"))
        }

        fn resolve_process_user(&mut self, pid: u32) -> Option<String> {
            self.user_calls.push(pid);
            (!self.failing_users.contains(&pid)).then(|| "alice".to_owned())
        }

        fn resolve_process_command_line(&mut self, pid: u32) -> Option<String> {
            self.command_calls.push(pid);
            Some(format!("/usr/bin/proc{pid} --flag"))
        }

        fn disk_totals(&mut self) -> Option<DiskRates> {
            None
        }

        fn net_totals(&mut self) -> Option<NetRates> {
            Some(NetRates {
                sent_bps: 1.0,
                recv_bps: 2.0,
            })
        }

        fn logical_cores(&self) -> usize {
            self.cores
        }

        fn ticks_per_second(&self) -> f64 {
            100.0
        }
    }

    fn raw(pid: u32, working_set: u64, ticks: u64) -> RawProcess {
        RawProcess {
            pid,
            parent_pid: 1,
            thread_count: 4,
            working_set,
            kernel_ticks: ticks / 2,
            user_ticks: ticks - ticks / 2,
            name: Some(format!("p{pid}")),
        }
    }

    fn sampler(processes: Vec<RawProcess>) -> Sampler<Mock> {
        Sampler::new(Mock {
            processes,
            cores: 2,
            ..Mock::default()
        })
    }

    fn cpu_of(snapshot: &MetricSnapshot, pid: u32) -> f64 {
        snapshot
            .processes
            .iter()
            .find(|p| p.pid == pid)
            .map(|p| p.cpu_percent)
            .unwrap()
    }

    #[test]
    fn system_cpu_uses_previous_ticks() {
        let mut sampler = sampler(vec![]);
        sampler.provider.ticks = Some(CpuTicks {
            idle: 1000,
            kernel: 1800,
            user: 500,
        });
        assert_eq!(sampler.tick(Duration::from_secs(1)).cpu_percent, 0.0);

        sampler.provider.ticks = Some(CpuTicks {
            idle: 1100,
            kernel: 1980,
            user: 550,
        });
        let usage = sampler.tick(Duration::from_secs(1)).cpu_percent;
        assert!((usage - 56.52).abs() < 0.01);
    }

    #[test]
    fn process_cpu_is_normalized_by_cores() {
        let mut sampler = sampler(vec![raw(7, 100, 100)]);
        let first = sampler.tick(Duration::from_secs(1));
        assert_eq!(cpu_of(&first, 7), 0.0, "no previous ticks yet");

        sampler.provider.processes = vec![raw(7, 100, 200)];
        let second = sampler.tick(Duration::from_secs(1));
        // 100 ticks over 1s * 100 ticks/s * 2 cores
        assert!((cpu_of(&second, 7) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn process_cpu_is_clamped() {
        let mut sampler = sampler(vec![raw(7, 100, 0)]);
        sampler.tick(Duration::from_secs(1));
        sampler.provider.processes = vec![raw(7, 100, 10_000_000)];
        let snapshot = sampler.tick(Duration::from_millis(10));
        assert_eq!(cpu_of(&snapshot, 7), MAX_PROCESS_CPU);
    }

    #[test]
    fn new_pid_starts_at_zero() {
        let mut sampler = sampler(vec![raw(1, 100, 50)]);
        sampler.tick(Duration::from_secs(1));
        sampler.provider.processes = vec![raw(1, 100, 60), raw(2, 50, 5000)];
        let snapshot = sampler.tick(Duration::from_secs(1));
        assert_eq!(cpu_of(&snapshot, 2), 0.0);
        assert!(cpu_of(&snapshot, 1) > 0.0);
    }

    #[test]
    fn processes_are_ordered_by_working_set() {
        let mut sampler = sampler(vec![raw(1, 10, 0), raw(2, 30, 0), raw(3, 20, 0)]);
        let snapshot = sampler.tick(Duration::from_secs(1));
        let pids = snapshot.processes.iter().map(|p| p.pid).collect::<Vec<_>>();
        assert_eq!(pids, vec![2, 3, 1]);
    }

    #[test]
    fn only_the_largest_processes_are_enriched() {
        let processes = (1..=ENRICH_LIMIT as u32 + 10)
            .map(|pid| raw(pid, u64::from(pid) * 1024, 0))
            .collect();
        let mut sampler = sampler(processes);
        let snapshot = sampler.tick(Duration::from_secs(1));

        assert_eq!(sampler.provider.user_calls.len(), ENRICH_LIMIT);
        assert_eq!(sampler.provider.command_calls.len(), ENRICH_LIMIT);
        // the ten smallest fall outside the eligible set.
        assert!(sampler.provider.user_calls.iter().all(|&pid| pid > 10));
        let smallest = snapshot.processes.last().unwrap();
        assert_eq!(smallest.pid, 1);
        assert_eq!(smallest.user, None);
        assert_eq!(smallest.command, None);
    }

    #[test]
    fn resolved_fields_are_cached() {
        let mut sampler = sampler(vec![raw(5, 100, 0)]);
        sampler.tick(Duration::from_secs(1));
        let snapshot = sampler.tick(Duration::from_secs(1));

        assert_eq!(sampler.provider.user_calls, vec![5]);
        assert_eq!(sampler.provider.command_calls, vec![5]);
        let record = &snapshot.processes[0];
        assert_eq!(record.user.as_deref(), Some("alice"));
        assert_eq!(record.command.as_deref(), Some("/usr/bin/proc5 --flag"));
    }

    #[test]
    fn failed_resolution_is_retried() {
        let mut sampler = sampler(vec![raw(5, 100, 0)]);
        sampler.provider.failing_users.insert(5);
        let first = sampler.tick(Duration::from_secs(1));
        assert_eq!(first.processes[0].user, None);

        sampler.provider.failing_users.clear();
        let second = sampler.tick(Duration::from_secs(1));
        assert_eq!(sampler.provider.user_calls, vec![5, 5]);
        assert_eq!(second.processes[0].user.as_deref(), Some("alice"));
    }

    #[test]
    fn missing_names_are_resolved_or_unknown() {
        let mut nameless = raw(9, 100, 0);
        nameless.name = None;
        let mut small = raw(10, 0, 0);
        small.name = Some(String::new());

        let mut processes = vec![nameless, small];
        // push pid 10 out of the eligible set.
        processes.extend((100..100 + ENRICH_LIMIT as u32).map(|pid| raw(pid, 50, 0)));
        let mut sampler = sampler(processes);
        let snapshot = sampler.tick(Duration::from_secs(1));

        let name = |pid| {
            snapshot
                .processes
                .iter()
                .find(|p| p.pid == pid)
                .map(|p| p.name.clone())
                .unwrap()
        };
        assert_eq!(name(9), "proc9");
        assert_eq!(name(10), "?");
        assert_eq!(sampler.provider.name_calls, vec![9]);
    }

    #[test]
    fn vanished_pids_are_purged() {
        let mut nameless = raw(2, 50, 10);
        nameless.name = None;
        let mut sampler = sampler(vec![raw(1, 100, 10), nameless]);
        sampler.tick(Duration::from_secs(1));
        for table in [&sampler.users, &sampler.commands] {
            assert!(table.contains_key(&2));
        }
        assert!(sampler.names.contains_key(&2));
        assert!(sampler.prev_ticks.contains_key(&2));

        sampler.provider.processes = vec![raw(1, 100, 20)];
        sampler.tick(Duration::from_secs(1));
        assert!(!sampler.prev_ticks.contains_key(&2));
        assert!(!sampler.names.contains_key(&2));
        assert!(!sampler.users.contains_key(&2));
        assert!(!sampler.commands.contains_key(&2));
        assert!(sampler.prev_ticks.contains_key(&1));
    }

    #[test]
    fn optional_counters_are_forwarded() {
        let mut sampler = sampler(vec![]);
        let snapshot = sampler.tick(Duration::from_secs(1));
        assert_eq!(snapshot.disk, None);
        assert_eq!(snapshot.net.map(|n| n.recv_bps), Some(2.0));
        assert_eq!(snapshot.per_core, vec![10.0, 10.0]);
        assert_eq!(snapshot.uptime_secs, None);
    }
}
