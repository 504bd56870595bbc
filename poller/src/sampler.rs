//! The sampling loop: wait for a slot, read every source, write one row.

use tracing::warn;
use util::config::{self, MAX_SAMPLE_PERIOD_SECS, MIN_SAMPLE_PERIOD_SECS};
use util::system_health::MetricsSource;

use crate::clock::Clock;
use crate::error::{PollerError, PollerResult};
use crate::rates::{CounterState, EnergyState};
use crate::report;
use crate::scheduler::Scheduler;
use crate::sensors::{self, EnergyCounter};
use crate::store::SampleSink;

/// One row per slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Slot start, milliseconds since the epoch.
    pub slot_ts: i64,
    pub cpu_used: f64,
    pub ram_used: f64,
    pub disk_used: f64,
    pub cpu_temp: Option<f64>,
    pub pwr_used: Option<f64>,
    pub net_up: f64,
    pub net_dn: f64,
}

/// Owns every piece of loop state: the scheduler, the network baseline and
/// the energy baseline. Nothing here is shared.
pub struct Poller<C, M, E, S> {
    clock: C,
    source: M,
    energy: E,
    sink: S,
    disk_path: String,
    scheduler: Scheduler,
    network: CounterState,
    energy_state: EnergyState,
}

impl<C, M, E, S> Poller<C, M, E, S>
where
    C: Clock,
    M: MetricsSource,
    E: EnergyCounter,
    S: SampleSink,
{
    /// Reads the network baseline and aligns the first tick to the grid.
    pub fn new(
        clock: C,
        mut source: M,
        energy: E,
        sink: S,
        period: f64,
        disk_path: impl Into<String>,
    ) -> PollerResult<Self> {
        if !config::period_in_range(period) {
            return Err(PollerError::Config(format!(
                "sampling period must be within {MIN_SAMPLE_PERIOD_SECS}..={MAX_SAMPLE_PERIOD_SECS} s, got {period}"
            )));
        }

        let baseline = source.net_counters()?;
        let now = clock.now();

        Ok(Self {
            network: CounterState::new(baseline, now),
            scheduler: Scheduler::new(period, now),
            energy_state: EnergyState::new(),
            disk_path: disk_path.into(),
            clock,
            source,
            energy,
            sink,
        })
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs one tick and returns the row that was handed to the sink.
    pub async fn tick(&mut self) -> PollerResult<Sample> {
        let tick = self.scheduler.wait(&self.clock).await;

        let cpu_used = self.source.cpu_percent()?;
        let ram_used = self.source.memory_percent()?;
        let disk_used = self.source.disk_percent(&self.disk_path)?;

        let cpu_temp = sensors::read_cpu_temperature(&mut self.source);
        let pwr_used =
            sensors::read_power(&self.energy, &mut self.energy_state, self.clock.now());

        let counters = self.source.net_counters()?;
        let net = self.network.update(counters, tick.now);

        let sample = Sample {
            slot_ts: tick.slot_ts(),
            cpu_used,
            ram_used,
            disk_used,
            cpu_temp,
            pwr_used,
            net_up: net.up,
            net_dn: net.down,
        };

        if !self.sink.record(&sample).await? {
            warn!(slot_ts = sample.slot_ts, "slot already stored, keeping existing row");
        }
        println!("{}", report::format_line(&sample));

        self.scheduler.complete(&tick);
        Ok(sample)
    }

    /// Ticks forever. Only a fatal error ends the loop.
    pub async fn run(&mut self) -> PollerResult<()> {
        loop {
            self.tick().await?;
        }
    }
}
