//! Optional readings: CPU temperature and package power.
//!
//! Both are best effort. Any failure becomes `None` here and the row is
//! written with a null field.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use util::system_health::{MetricsSource, SensorGroup};

use crate::rates::EnergyState;

/// Picks the CPU temperature from the available sensor groups.
///
/// Preference: an entry labelled as the CPU package or first core, then the
/// first entry of the first group, then nothing.
pub fn select_cpu_temperature(groups: &[SensorGroup]) -> Option<f64> {
    let preferred = groups
        .iter()
        .flat_map(|g| g.entries.iter())
        .find(|(label, _)| {
            let label = label.to_lowercase();
            label.contains("package") || label.contains("core 0")
        });

    preferred
        .or_else(|| groups.iter().find_map(|g| g.entries.first()))
        .map(|(_, value)| *value)
}

pub fn read_cpu_temperature<S: MetricsSource + ?Sized>(source: &mut S) -> Option<f64> {
    match source.temperatures() {
        Ok(groups) => select_cpu_temperature(&groups),
        Err(e) => {
            debug!(error = %e, "cpu temperature unavailable");
            None
        }
    }
}

/// Monotonic energy counter in microjoules.
///
/// `None` is a normal answer on hardware without the counter.
pub trait EnergyCounter {
    fn read_energy_uj(&self) -> Option<u64>;
}

/// Intel RAPL package counter exposed through powercap sysfs.
#[derive(Debug, Clone)]
pub struct RaplCounter {
    path: PathBuf,
}

impl RaplCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EnergyCounter for RaplCounter {
    fn read_energy_uj(&self) -> Option<u64> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "energy counter unreadable");
                return None;
            }
        };

        match raw.trim().parse::<u64>() {
            Ok(uj) => Some(uj),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "energy counter malformed");
                None
            }
        }
    }
}

/// Reads the counter and turns it into watts against `state`.
///
/// A failed read leaves `state` untouched.
pub fn read_power<E: EnergyCounter + ?Sized>(
    counter: &E,
    state: &mut EnergyState,
    now: f64,
) -> Option<f64> {
    let energy_uj = counter.read_energy_uj()?;
    let watts = state.observe(energy_uj, now);
    if watts.is_none() {
        debug!(energy_uj, "power sample skipped");
    }
    watts
}
