//! Headless drivers: one simulation for a fixed number of ticks, or many
//! independent ones in parallel.

use evolarium_core::{SimConfig, Simulation, StepEvents};
use evolarium_data::{Trait, WorldSettings};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;

/// Outcome of one headless run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: Option<u64>,
    pub ticks: u64,
    pub population: usize,
    pub food: usize,
    pub zones: usize,
    pub max_generation: u32,
    pub births: u64,
    pub kills: u64,
    pub starvations: u64,
    pub food_eaten: u64,
    /// Mean of every trait over the final population, in [`Trait::ALL`] order.
    pub trait_means: Vec<(String, f64)>,
    pub config_fingerprint: String,
    pub elapsed_ms: u64,
}

/// Advances `sim` by `ticks` ticks and summarizes the result.
pub fn run_headless(sim: &mut Simulation, ticks: u64) -> RunReport {
    let started = Instant::now();
    let mut totals = StepEvents::default();
    for _ in 0..ticks {
        let events = sim.tick();
        totals.merge(&events);
    }
    sim.sample_stats();

    let max_generation = sim
        .organisms
        .iter_active()
        .map(|i| sim.organisms.generation[i])
        .max()
        .unwrap_or(0);
    let trait_means = Trait::ALL
        .iter()
        .map(|&t| (t.name().to_string(), sim.stats.histogram(t).mean))
        .collect();

    let report = RunReport {
        seed: sim.config.seed,
        ticks,
        population: sim.population(),
        food: sim.food_count(),
        zones: sim.zones.len(),
        max_generation,
        births: totals.births,
        kills: totals.kills,
        starvations: totals.starvations,
        food_eaten: totals.food_eaten,
        trait_means,
        config_fingerprint: sim.config.fingerprint(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    tracing::info!(
        seed = ?report.seed,
        population = report.population,
        max_generation = report.max_generation,
        elapsed_ms = report.elapsed_ms,
        "Run finished"
    );
    report
}

/// Runs `runs` independent worlds on the rayon pool. Run `i` uses seed
/// `base_seed + i`; each worker owns its simulation outright.
pub fn run_batch(
    config: &SimConfig,
    world: &WorldSettings,
    ticks: u64,
    runs: usize,
    base_seed: u64,
) -> anyhow::Result<Vec<RunReport>> {
    (0..runs)
        .into_par_iter()
        .map(|i| -> anyhow::Result<RunReport> {
            let config = SimConfig {
                seed: Some(base_seed.wrapping_add(i as u64)),
                ..config.clone()
            };
            let mut sim = Simulation::new(config, *world)?;
            Ok(run_headless(&mut sim, ticks))
        })
        .collect()
}
