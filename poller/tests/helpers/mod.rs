#![allow(dead_code)]

use std::cell::Cell;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use poller::clock::Clock;
use poller::sensors::EnergyCounter;
use util::system_health::{MetricsError, MetricsSource, NetCounters, SensorGroup};

/// Manually driven clock. Sleeping jumps straight to the wake-up time.
#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<f64>>,
}

impl FakeClock {
    pub fn at(now: f64) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, secs: f64) {
        *self.now.lock().unwrap() += secs;
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration.as_secs_f64());
    }
}

/// Scripted host readings.
pub struct FakeSource {
    pub clock: FakeClock,
    pub cpu: f64,
    pub ram: f64,
    pub disk: Result<f64, String>,
    pub temps: Option<Vec<SensorGroup>>,
    /// Added to the counters on every `net_counters` call.
    pub sent_step: u64,
    pub recv_step: u64,
    /// Seconds the clock jumps during the CPU read of the given tick (0-based).
    pub stall_on_tick: Option<(usize, f64)>,
    counters: NetCounters,
    ticks: usize,
}

impl FakeSource {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            cpu: 12.5,
            ram: 40.0,
            disk: Ok(63.0),
            temps: Some(vec![SensorGroup {
                name: "coretemp".into(),
                entries: vec![("Core 1".into(), 50.0), ("Package id 0".into(), 55.0)],
            }]),
            sent_step: 5_000,
            recv_step: 10_000,
            stall_on_tick: None,
            counters: NetCounters::default(),
            ticks: 0,
        }
    }
}

impl MetricsSource for FakeSource {
    fn cpu_percent(&mut self) -> Result<f64, MetricsError> {
        if let Some((tick, secs)) = self.stall_on_tick {
            if tick == self.ticks {
                self.clock.advance(secs);
            }
        }
        self.ticks += 1;
        Ok(self.cpu)
    }

    fn memory_percent(&mut self) -> Result<f64, MetricsError> {
        Ok(self.ram)
    }

    fn disk_percent(&mut self, mount: &str) -> Result<f64, MetricsError> {
        self.disk
            .clone()
            .map_err(|reason| MetricsError::DiskUnavailable {
                path: mount.to_string(),
                reason,
            })
    }

    fn temperatures(&mut self) -> Result<Vec<SensorGroup>, MetricsError> {
        self.temps
            .clone()
            .ok_or_else(|| MetricsError::Sensors("no sensors".into()))
    }

    fn net_counters(&mut self) -> Result<NetCounters, MetricsError> {
        self.counters.bytes_sent += self.sent_step;
        self.counters.bytes_recv += self.recv_step;
        Ok(self.counters)
    }
}

/// Energy counter growing by a fixed step per read, or absent.
pub struct FakeEnergy {
    value: Cell<u64>,
    step: u64,
    present: bool,
}

impl FakeEnergy {
    pub fn stepping(step: u64) -> Self {
        Self {
            value: Cell::new(0),
            step,
            present: true,
        }
    }

    pub fn absent() -> Self {
        Self {
            value: Cell::new(0),
            step: 0,
            present: false,
        }
    }
}

impl EnergyCounter for FakeEnergy {
    fn read_energy_uj(&self) -> Option<u64> {
        if !self.present {
            return None;
        }
        self.value.set(self.value.get() + self.step);
        Some(self.value.get())
    }
}
