//! Host metrics collaborator backed by `sysinfo`.
//!
//! [`MetricsSource`] is the seam the poller samples through. [`SysinfoSource`]
//! keeps its `sysinfo` handles alive between reads so that CPU usage is
//! reported "since the previous read" and network totals stay cumulative.
//! Disk usage is taken with `statvfs` on the configured path itself, since
//! `sysinfo` leaves pseudo filesystems such as tmpfs out of its disk list.

use nix::sys::statvfs::statvfs;
use sysinfo::{Components, Networks, System};

/// Errors raised while reading a mandatory host metric.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("no CPUs reported by the host")]
    NoCpus,

    #[error("host reports zero total memory")]
    NoMemory,

    #[error("cannot stat filesystem at {path}: {reason}")]
    DiskUnavailable { path: String, reason: String },

    #[error("filesystem at {0} reports zero capacity")]
    EmptyDisk(String),

    #[error("sensor data unavailable: {0}")]
    Sensors(String),
}

/// Cumulative network byte counters since an arbitrary origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// A named group of temperature readings, e.g. a single hwmon chip.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorGroup {
    pub name: String,
    /// Ordered `(label, current °C)` entries.
    pub entries: Vec<(String, f64)>,
}

/// Instantaneous and cumulative host readings consumed by the poller.
pub trait MetricsSource {
    /// Global CPU utilization in percent since the previous call.
    fn cpu_percent(&mut self) -> Result<f64, MetricsError>;

    fn memory_percent(&mut self) -> Result<f64, MetricsError>;

    /// Used space, in percent, of the filesystem that holds `mount`.
    fn disk_percent(&mut self, mount: &str) -> Result<f64, MetricsError> {
        let stat = statvfs(mount).map_err(|e| MetricsError::DiskUnavailable {
            path: mount.to_string(),
            reason: e.to_string(),
        })?;

        let frsize = stat.fragment_size() as u64;
        let usage = BlockUsage {
            blocks: stat.blocks() as u64 * frsize,
            free: stat.blocks_free() as u64 * frsize,
            available: stat.blocks_available() as u64 * frsize,
        };
        usage
            .percent()
            .ok_or_else(|| MetricsError::EmptyDisk(mount.to_string()))
    }

    fn temperatures(&mut self) -> Result<Vec<SensorGroup>, MetricsError>;

    fn net_counters(&mut self) -> Result<NetCounters, MetricsError>;
}

/// [`MetricsSource`] reading from the live host through `sysinfo`.
pub struct SysinfoSource {
    sys: System,
    networks: Networks,
    components: Components,
}

impl SysinfoSource {
    /// Builds the source and primes the CPU usage baseline so the first
    /// `cpu_percent` call reports the interval since construction.
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        Self {
            sys,
            networks: Networks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for SysinfoSource {
    fn cpu_percent(&mut self) -> Result<f64, MetricsError> {
        self.sys.refresh_cpu_usage();
        if self.sys.cpus().is_empty() {
            return Err(MetricsError::NoCpus);
        }
        Ok(f64::from(self.sys.global_cpu_usage()))
    }

    fn memory_percent(&mut self) -> Result<f64, MetricsError> {
        self.sys.refresh_memory();
        percent_of(self.sys.used_memory(), self.sys.total_memory()).ok_or(MetricsError::NoMemory)
    }

    fn temperatures(&mut self) -> Result<Vec<SensorGroup>, MetricsError> {
        self.components.refresh(true);
        let readings: Vec<(String, f64)> = self
            .components
            .list()
            .iter()
            .filter_map(|c| c.temperature().map(|t| (c.label().to_string(), f64::from(t))))
            .filter(|(_, t)| t.is_finite())
            .collect();

        if readings.is_empty() {
            return Err(MetricsError::Sensors("no temperature sensors".into()));
        }
        Ok(group_by_chip(readings))
    }

    fn net_counters(&mut self) -> Result<NetCounters, MetricsError> {
        self.networks.refresh(true);
        let mut counters = NetCounters::default();
        for data in self.networks.list().values() {
            counters.bytes_sent = counters.bytes_sent.saturating_add(data.total_transmitted());
            counters.bytes_recv = counters.bytes_recv.saturating_add(data.total_received());
        }
        Ok(counters)
    }
}

fn percent_of(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(used as f64 / total as f64 * 100.0)
}

/// Byte counts from a `statvfs` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockUsage {
    blocks: u64,
    /// Free space including blocks reserved for root.
    free: u64,
    /// Free space available to unprivileged users.
    available: u64,
}

impl BlockUsage {
    /// Used share of the space visible to unprivileged users, the way `df`
    /// reports it: `used / (used + available)` with `used = blocks - free`.
    /// Root-reserved blocks count as neither used nor available.
    fn percent(&self) -> Option<f64> {
        let used = self.blocks.saturating_sub(self.free);
        percent_of(used, used.saturating_add(self.available))
    }
}

/// Groups flat `sysinfo` component labels ("coretemp Package id 0") by their
/// chip prefix, preserving first-seen order of groups and entries.
fn group_by_chip(readings: Vec<(String, f64)>) -> Vec<SensorGroup> {
    let mut groups: Vec<SensorGroup> = Vec::new();
    for (label, value) in readings {
        let (chip, rest) = match label.split_once(' ') {
            Some((chip, rest)) => (chip.to_string(), rest.to_string()),
            None => (label.clone(), label.clone()),
        };
        match groups.iter_mut().find(|g| g.name == chip) {
            Some(group) => group.entries.push((rest, value)),
            None => groups.push(SensorGroup {
                name: chip,
                entries: vec![(rest, value)],
            }),
        }
    }
    groups
}
