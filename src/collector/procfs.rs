//! Tick counters read from `/proc`.
//!
//! sysinfo only hands out pre-digested percentages, so the raw counters the
//! sampler differentiates itself come straight from the kernel tables.

use crate::types::CpuTicks;

/// The number of clock ticks in a second.
///
/// This can be obtained via `getconf(1)` and `CLK_TCK`. It is 100 on every
/// mainstream linux configuration, so it is hard-coded.
pub const USER_HZ: f64 = 100.0;

/// Bytes per sector in `/proc/diskstats`, regardless of the device.
pub(crate) const SECTOR_SIZE: u64 = 512;

/// Per-process counters from `/proc/<pid>/stat`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ProcStat {
    pub utime: u64,
    pub stime: u64,
    pub threads: u32,
}

/// Cumulative sectors moved by whole disks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct DiskSectors {
    pub read: u64,
    pub written: u64,
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
///
/// The line holds user, nice, system, idle, iowait, irq, softirq and steal
/// times (guest time is already folded into user). These collapse into the
/// idle/kernel/user triple, with idle counted inside kernel.
pub(crate) fn parse_cpu_line(line: &str) -> Option<CpuTicks> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "cpu" {
        return None;
    }

    let fields = tokens
        .take(8)
        .map(str::parse::<u64>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    let [user, nice, system, idle, rest @ ..] = fields.as_slice() else {
        return None;
    };
    let field = |i: usize| rest.get(i).copied().unwrap_or(0);
    let (iowait, irq, softirq, steal) = (field(0), field(1), field(2), field(3));

    let idle = idle + iowait;
    Some(CpuTicks {
        idle,
        kernel: system + irq + softirq + steal + idle,
        user: user + nice,
    })
}

/// Parses `/proc/<pid>/stat`.
///
/// The command name sits in parentheses and may itself contain spaces or
/// parentheses, so fields are counted from the last `)`.
pub(crate) fn parse_process_stat(text: &str) -> Option<ProcStat> {
    let tail = &text[text.rfind(')')? + 1..];
    let fields = tail.split_whitespace().collect::<Vec<_>>();

    // `fields[0]` is field 3 (state) in proc_pid_stat(5) numbering.
    let field = |n: usize| fields.get(n - 3).and_then(|f| f.parse::<u64>().ok());
    Some(ProcStat {
        utime: field(14)?,
        stime: field(15)?,
        threads: field(20)?.try_into().ok()?,
    })
}

/// Sums the sector counters of `/proc/diskstats` over devices `is_disk` accepts.
pub(crate) fn parse_diskstats(text: &str, is_disk: impl Fn(&str) -> bool) -> DiskSectors {
    text.lines()
        .filter_map(|line| {
            let fields = line.split_whitespace().collect::<Vec<_>>();
            let name = fields.get(2)?;
            if !is_disk(name) {
                return None;
            }
            let read = fields.get(5)?.parse::<u64>().ok()?;
            let written = fields.get(9)?.parse::<u64>().ok()?;
            Some(DiskSectors { read, written })
        })
        .fold(DiskSectors::default(), |acc, d| DiskSectors {
            read: acc.read + d.read,
            written: acc.written + d.written,
        })
}

/// Block devices whose i/o is also counted on the disks beneath them, or
/// that live in memory: loop, ram, zram, device-mapper and md raid.
pub(crate) fn is_virtual_device(name: &str) -> bool {
    const PREFIXES: [&str; 5] = ["loop", "ram", "zram", "dm-", "md"];
    PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

#[cfg(target_os = "linux")]
mod read {
    use super::*;
    use std::{fs, path::Path};

    pub(crate) fn cpu_ticks() -> Option<CpuTicks> {
        let stat = fs::read_to_string("/proc/stat").ok()?;
        stat.lines().next().and_then(parse_cpu_line)
    }

    pub(crate) fn process_stat(pid: u32) -> Option<ProcStat> {
        let stat = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
        parse_process_stat(&stat)
    }

    /// Whole block devices appear under `/sys/block`; partitions and
    /// stacked or virtual devices are skipped to avoid double counting.
    pub(crate) fn disk_sectors() -> Option<DiskSectors> {
        let stats = fs::read_to_string("/proc/diskstats").ok()?;
        Some(parse_diskstats(&stats, |name| {
            !is_virtual_device(name) && Path::new("/sys/block").join(name).exists()
        }))
    }
}

#[cfg(not(target_os = "linux"))]
mod read {
    use super::*;

    pub(crate) fn cpu_ticks() -> Option<CpuTicks> {
        None
    }

    pub(crate) fn process_stat(_pid: u32) -> Option<ProcStat> {
        None
    }

    pub(crate) fn disk_sectors() -> Option<DiskSectors> {
        None
    }
}

pub(crate) use self::read::{cpu_ticks, disk_sectors, process_stat};

#[cfg(test)]
mod tests {
    use super::*;

    // example provided in the `proc_stat(5)` man page.
    const CPU_LINE: &str = "cpu  10132153 290696 3084719 46828483 16683 0 25195 0 175628 0";

    #[test]
    fn cpu_line() {
        let ticks = parse_cpu_line(CPU_LINE).unwrap();
        assert_eq!(ticks.idle, 46828483 + 16683);
        assert_eq!(ticks.user, 10132153 + 290696);
        assert_eq!(ticks.kernel, 3084719 + 25195 + ticks.idle);
    }

    #[test]
    fn cpu_line_from_old_kernel() {
        let ticks = parse_cpu_line("cpu 10 20 30 40").unwrap();
        assert_eq!(
            ticks,
            CpuTicks {
                idle: 40,
                kernel: 70,
                user: 30
            }
        );
    }

    #[test]
    fn per_cpu_lines_are_rejected() {
        assert_eq!(parse_cpu_line("cpu0 1 2 3 4 5 6 7 8 9 0"), None);
        assert_eq!(parse_cpu_line("intr 1462898"), None);
        assert_eq!(parse_cpu_line("cpu 1 2 x 4"), None);
    }

    #[test]
    fn process_stat_with_awkward_name() {
        let stat = "1234 (tmux: server (1)) S 1 1234 1234 0 -1 4194560 1046 0 0 0 \
                    250 75 0 0 20 0 3 0 4538 11550720 1122 18446744073709551615";
        let parsed = parse_process_stat(stat).unwrap();
        assert_eq!(
            parsed,
            ProcStat {
                utime: 250,
                stime: 75,
                threads: 3
            }
        );
    }

    #[test]
    fn truncated_process_stat() {
        assert_eq!(parse_process_stat("1 (init) S 0 1"), None);
        assert_eq!(parse_process_stat("garbage"), None);
    }

    #[test]
    fn diskstats_sums_accepted_devices() {
        let stats = "\
   8       0 sda 100 0 800 0 50 0 400 0 0 0 0
   8       1 sda1 90 0 700 0 40 0 300 0 0 0 0
 259       0 nvme0n1 10 0 80 0 5 0 40 0 0 0 0
   7       0 loop0 1 0 8 0 0 0 0 0 0 0 0";
        let sectors = parse_diskstats(stats, |name| name == "sda" || name == "nvme0n1");
        assert_eq!(
            sectors,
            DiskSectors {
                read: 880,
                written: 440
            }
        );
    }

    #[test]
    fn stacked_devices_are_not_disks() {
        for name in ["dm-0", "dm-12", "md0", "md127", "loop3", "zram0", "ram1"] {
            assert!(is_virtual_device(name), "{name}");
        }
        for name in ["sda", "nvme0n1", "vdb", "mmcblk0", "xvda"] {
            assert!(!is_virtual_device(name), "{name}");
        }
    }
}
