//! Epoch-aligned tick scheduling.
//!
//! Ticks land on a grid of `period`-second slots counted from the Unix epoch,
//! so restarts keep producing timestamps on the same grid. The arithmetic is
//! kept in free functions so drift and resync behavior can be checked without
//! waiting on a real clock.

use std::time::Duration;

use tracing::{debug, info};

use crate::clock::Clock;

/// Start of the slot containing `now`.
pub fn slot_for(now: f64, period: f64) -> f64 {
    (now / period).floor() * period
}

/// First grid boundary strictly after the slot containing `now`.
///
/// A `now` exactly on a boundary yields the *next* boundary.
pub fn initial_target(now: f64, period: f64) -> f64 {
    slot_for(now, period) + period
}

/// Next target after a tick that fired at `now`.
///
/// Normally one period past `next_target`. When the loop has fallen a full
/// period or more behind, missed slots are dropped and the target resyncs to
/// the boundary after `now`, so a stall never turns into a burst of
/// back-to-back catch-up ticks.
pub fn advance(next_target: f64, period: f64, now: f64) -> f64 {
    let candidate = next_target + period;
    if candidate <= now {
        initial_target(now, period)
    } else {
        candidate
    }
}

/// Slot start converted to the integer millisecond key stored per row.
pub fn slot_millis(slot: f64) -> i64 {
    (slot * 1000.0).round() as i64
}

/// Waits until the clock reaches `next_target` and returns the time on waking.
///
/// Returns immediately when the target is already in the past. After a sleep
/// the result is never earlier than `next_target`, since the monotonic sleep
/// and the wall clock can disagree by a few microseconds.
pub async fn await_tick<C: Clock + ?Sized>(clock: &C, next_target: f64) -> f64 {
    let now = clock.now();
    if now < next_target {
        let wait = Duration::try_from_secs_f64(next_target - now).unwrap_or(Duration::MAX);
        clock.sleep(wait).await;
        return clock.now().max(next_target);
    }
    now
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Target computed, not yet reached.
    Idle,
    /// Tick fired, sample in progress.
    Sampling,
}

/// A fired tick: when it actually ran and the slot it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub now: f64,
    pub slot: f64,
}

impl Tick {
    pub fn slot_ts(&self) -> i64 {
        slot_millis(self.slot)
    }
}

/// Owns the next target and the Idle/Sampling phase of the loop.
#[derive(Debug, Clone)]
pub struct Scheduler {
    period: f64,
    next_target: f64,
    phase: Phase,
}

impl Scheduler {
    pub fn new(period: f64, now: f64) -> Self {
        Self {
            period,
            next_target: initial_target(now, period),
            phase: Phase::Idle,
        }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn next_target(&self) -> f64 {
        self.next_target
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Idle -> Sampling once the clock reaches the target.
    pub async fn wait<C: Clock + ?Sized>(&mut self, clock: &C) -> Tick {
        let now = await_tick(clock, self.next_target).await;
        self.phase = Phase::Sampling;
        Tick {
            now,
            slot: slot_for(now, self.period),
        }
    }

    /// Sampling -> Idle, computing the following target.
    pub fn complete(&mut self, tick: &Tick) {
        let next = advance(self.next_target, self.period, tick.now);
        if next != self.next_target + self.period {
            let skipped = ((next - self.next_target) / self.period).round() as i64 - 1;
            info!(
                behind_secs = tick.now - self.next_target,
                skipped_slots = skipped,
                "scheduler fell behind, resyncing to grid"
            );
        } else {
            debug!(next_target = next, "scheduled next tick");
        }
        self.next_target = next;
        self.phase = Phase::Idle;
    }
}
