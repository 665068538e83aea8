//! Per-tick counters and periodic structured log lines.

use crate::behavior::StepEvents;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// A summary line is logged every this many ticks.
pub const LOG_EVERY_TICKS: u64 = 1000;

/// Running totals for one simulation.
#[derive(Debug, Clone)]
pub struct TickMetrics {
    ticks: u64,
    population: usize,
    food: usize,
    /// Events from the most recent tick, all sub-steps merged.
    pub last: StepEvents,
    /// Events since creation or the last reset.
    pub totals: StepEvents,
    busiest_tick: Duration,
    total_time: Duration,
    start_time: Instant,
}

impl Default for TickMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TickMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ticks: 0,
            population: 0,
            food: 0,
            last: StepEvents::default(),
            totals: StepEvents::default(),
            busiest_tick: Duration::ZERO,
            total_time: Duration::ZERO,
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(
        &mut self,
        duration: Duration,
        events: StepEvents,
        population: usize,
        food: usize,
    ) {
        self.ticks += 1;
        self.population = population;
        self.food = food;
        self.last = events;
        self.totals.merge(&events);
        self.total_time += duration;
        self.busiest_tick = self.busiest_tick.max(duration);

        if self.ticks.is_multiple_of(LOG_EVERY_TICKS) {
            tracing::info!(
                tick = self.ticks,
                population,
                food,
                births = self.totals.births,
                kills = self.totals.kills,
                starvations = self.totals.starvations,
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.population
    }

    #[must_use]
    pub fn food(&self) -> usize {
        self.food
    }

    /// Mean wall time per recorded tick.
    #[must_use]
    pub fn mean_tick_time(&self) -> Duration {
        if self.ticks == 0 {
            return Duration::ZERO;
        }
        self.total_time / self.ticks.min(u32::MAX as u64) as u32
    }

    #[must_use]
    pub fn busiest_tick(&self) -> Duration {
        self.busiest_tick
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Builds the filter for [`init_logging`]: `RUST_LOG` when set, otherwise
/// `default_directive` (`"info"`, `"evolarium_core=debug"`, ...). An
/// unparsable directive falls back to info.
#[must_use]
pub fn log_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a global fmt subscriber filtered by [`log_filter`]. Later calls
/// are ignored.
pub fn init_logging(default_directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(default_directive))
        .try_init()
        .ok();
}
