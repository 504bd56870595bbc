//! Rates derived from cumulative counters.
//!
//! Network and energy counters share the finite-difference arithmetic but
//! differ in how they treat a non-positive elapsed time:
//!
//! - network floors the interval to one second and always moves its baseline;
//! - energy reports nothing and keeps the old baseline, so the next read
//!   measures against a reference point that is actually in the past.

use util::system_health::NetCounters;

/// Interval used for network rates when the clock did not move forward.
pub const MIN_NETWORK_INTERVAL_SECS: f64 = 1.0;

const MICROJOULES_PER_JOULE: f64 = 1e6;

/// Average rate between two counter readings, or `None` when `dt <= 0`.
pub fn rate(curr_counter: f64, prev_counter: f64, curr_time: f64, prev_time: f64) -> Option<f64> {
    let dt = curr_time - prev_time;
    if dt <= 0.0 {
        return None;
    }
    Some((curr_counter - prev_counter) / dt)
}

/// Upload and download throughput in bytes per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NetRates {
    pub up: f64,
    pub down: f64,
}

/// Previous network counters and when they were read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterState {
    pub prev_bytes_sent: u64,
    pub prev_bytes_recv: u64,
    pub prev_time: f64,
}

impl CounterState {
    /// Records the baseline that the first [`CounterState::update`] measures against.
    pub fn new(baseline: NetCounters, now: f64) -> Self {
        Self {
            prev_bytes_sent: baseline.bytes_sent,
            prev_bytes_recv: baseline.bytes_recv,
            prev_time: now,
        }
    }

    /// Rates since the previous reading. The baseline always moves to `curr`.
    ///
    /// A counter that went backwards (interface removed, counter reset) reads
    /// as zero throughput for that interval.
    pub fn update(&mut self, curr: NetCounters, now: f64) -> NetRates {
        let elapsed = match now - self.prev_time {
            dt if dt > 0.0 => dt,
            _ => MIN_NETWORK_INTERVAL_SECS,
        };

        let rates = NetRates {
            up: curr.bytes_sent.saturating_sub(self.prev_bytes_sent) as f64 / elapsed,
            down: curr.bytes_recv.saturating_sub(self.prev_bytes_recv) as f64 / elapsed,
        };

        self.prev_bytes_sent = curr.bytes_sent;
        self.prev_bytes_recv = curr.bytes_recv;
        self.prev_time = now;
        rates
    }
}

/// Last energy reading, absent until the first successful read.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyState {
    pub last_energy_uj: Option<u64>,
    pub last_time: Option<f64>,
}

impl EnergyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Power in watts since the previous reading.
    ///
    /// Returns `None` and only records the baseline on the first reading.
    /// Returns `None` *without* touching the baseline when `now` is not after
    /// the previous reading. A counter that went backwards (wraparound or
    /// reset) returns `None` and re-baselines.
    pub fn observe(&mut self, energy_uj: u64, now: f64) -> Option<f64> {
        let (Some(last_energy), Some(last_time)) = (self.last_energy_uj, self.last_time) else {
            self.record(energy_uj, now);
            return None;
        };

        if now - last_time <= 0.0 {
            return None;
        }

        self.record(energy_uj, now);
        if energy_uj < last_energy {
            return None;
        }

        rate(energy_uj as f64, last_energy as f64, now, last_time)
            .map(|uj_per_sec| uj_per_sec / MICROJOULES_PER_JOULE)
    }

    fn record(&mut self, energy_uj: u64, now: f64) {
        self.last_energy_uj = Some(energy_uj);
        self.last_time = Some(now);
    }
}
