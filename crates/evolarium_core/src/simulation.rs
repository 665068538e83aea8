//! The simulation context: every store, index and setting one world needs.

use crate::behavior::{self, StepContext, StepEvents};
use crate::config::SimConfig;
use crate::environment::EnvironmentZones;
use crate::genetics;
use crate::metrics::TickMetrics;
use crate::spatial_grid::SpatialGrid;
use crate::stats::TraitHistograms;
use crate::store::{FoodStore, OrganismStore, MAX_FOOD, MAX_ORGANISMS};
use crate::torus;
use evolarium_data::{OrganismRecord, Trait, WorldSettings};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Probability that a replenished pellet lands next to an existing one.
pub const FOOD_CLUSTER_CHANCE: f64 = 0.6;
/// Farthest a clustered pellet lands from its anchor, per axis.
pub const FOOD_CLUSTER_RADIUS: f64 = 60.0;

/// One self-contained world. Hosts drive it by calling [`Simulation::tick`].
pub struct Simulation {
    pub config: SimConfig,
    pub world: WorldSettings,
    pub organisms: OrganismStore,
    pub food: FoodStore,
    pub zones: EnvironmentZones,
    pub stats: TraitHistograms,
    pub metrics: TickMetrics,
    organism_grid: SpatialGrid,
    food_grid: SpatialGrid,
    rng: ChaCha8Rng,
    tick: u64,
    step: u64,
    extinct_ticks: u64,
}

impl Simulation {
    /// Builds a world at full capacity and seeds its initial population and
    /// food.
    pub fn new(config: SimConfig, world: WorldSettings) -> anyhow::Result<Self> {
        Self::with_capacity(config, world, MAX_ORGANISMS, MAX_FOOD)
    }

    pub fn with_capacity(
        config: SimConfig,
        world: WorldSettings,
        organism_capacity: usize,
        food_capacity: usize,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        anyhow::ensure!(
            world.size.is_finite() && world.size > 0.0,
            "World size must be positive"
        );

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut sim = Self {
            organism_grid: SpatialGrid::new(world.size, config.cell_size, organism_capacity),
            food_grid: SpatialGrid::new(world.size, config.cell_size, food_capacity),
            organisms: OrganismStore::new(organism_capacity),
            food: FoodStore::new(food_capacity),
            zones: EnvironmentZones::new(),
            stats: TraitHistograms::new(),
            metrics: TickMetrics::new(),
            config,
            world,
            rng,
            tick: 0,
            step: 0,
            extinct_ticks: 0,
        };
        sim.populate();

        tracing::info!(
            organisms = sim.organisms.len(),
            food = sim.food.len(),
            world_size = sim.world.size,
            config = %sim.config.fingerprint(),
            "Simulation created"
        );
        Ok(sim)
    }

    fn populate(&mut self) {
        for _ in 0..self.config.initial_population {
            if self.spawn_random_organism().is_none() {
                break;
            }
        }
        for _ in 0..self.config.initial_food {
            let x = self.rng.gen_range(0.0..self.world.size);
            let y = self.rng.gen_range(0.0..self.world.size);
            if self.spawn_food(x, y).is_none() {
                break;
            }
        }
    }

    /// Drifts the zones once, runs `sim_speed` sub-steps, then extinction
    /// recovery, periodic stats sampling and metrics.
    pub fn tick(&mut self) -> StepEvents {
        let started = Instant::now();
        if self.world.flags.zones {
            self.zones
                .update(&self.config, self.world.size, &mut self.rng);
        }

        let mut events = StepEvents::default();
        for _ in 0..self.world.sim_speed {
            let sub = self.step();
            events.merge(&sub);
        }
        self.tick += 1;

        self.recover_from_extinction();

        if self.config.stats_interval > 0 && self.tick.is_multiple_of(self.config.stats_interval) {
            self.sample_stats();
        }

        self.metrics.record_tick(
            started.elapsed(),
            events,
            self.organisms.len(),
            self.food.len(),
        );

        if self.world.flags.debug {
            tracing::debug!(
                tick = self.tick,
                population = self.organisms.len(),
                food = self.food.len(),
                zones = self.zones.len(),
                births = events.births,
                kills = events.kills,
                starvations = events.starvations,
                "Tick summary"
            );
        }
        events
    }

    /// One behavior sub-step: grid rebuild, food, organisms. Zones hold
    /// still between ticks.
    pub fn step(&mut self) -> StepEvents {
        self.step += 1;

        self.organism_grid.rebuild(
            &self.organisms.x,
            &self.organisms.y,
            self.organisms.active_flags(),
        );
        self.food_grid
            .rebuild(&self.food.x, &self.food.y, self.food.active_flags());

        self.replenish_food();

        let ctx = StepContext {
            config: &self.config,
            world: &self.world,
            zones: &self.zones,
            organism_grid: &self.organism_grid,
            food_grid: &self.food_grid,
            step: self.step,
        };
        let mut events = StepEvents::default();
        behavior::run_step(
            &ctx,
            &mut self.organisms,
            &mut self.food,
            &mut self.rng,
            &mut events,
        );
        events
    }

    fn recover_from_extinction(&mut self) {
        if !self.organisms.is_empty() {
            self.extinct_ticks = 0;
            return;
        }
        self.extinct_ticks += 1;
        if self.config.reseed_count == 0 || self.extinct_ticks < self.config.reseed_delay {
            return;
        }
        let mut spawned = 0;
        for _ in 0..self.config.reseed_count {
            if self.spawn_random_organism().is_none() {
                break;
            }
            spawned += 1;
        }
        tracing::info!(tick = self.tick, spawned, "Population extinct, reseeding");
        self.extinct_ticks = 0;
    }

    fn replenish_food(&mut self) {
        let rate = self.config.food_spawn_rate;
        let mut count = rate.floor() as usize;
        if self.rng.gen::<f64>() < rate.fract() {
            count += 1;
        }
        for _ in 0..count {
            if self.food.len() >= self.config.max_food {
                break;
            }
            let (x, y) = self.food_spawn_point();
            if self.spawn_food(x, y).is_none() {
                break;
            }
        }
    }

    /// Uniform point, or a point near a random existing pellet so food
    /// gathers in patches.
    fn food_spawn_point(&mut self) -> (f64, f64) {
        let size = self.world.size;
        if !self.food.is_empty() && self.rng.gen::<f64>() < FOOD_CLUSTER_CHANCE {
            let nth = self.rng.gen_range(0..self.food.len());
            if let Some(anchor) = self.food.iter_active().nth(nth) {
                let dx = self.rng.gen_range(-FOOD_CLUSTER_RADIUS..=FOOD_CLUSTER_RADIUS);
                let dy = self.rng.gen_range(-FOOD_CLUSTER_RADIUS..=FOOD_CLUSTER_RADIUS);
                return (
                    torus::wrap(self.food.x[anchor] + dx, size),
                    torus::wrap(self.food.y[anchor] + dy, size),
                );
            }
        }
        (self.rng.gen_range(0.0..size), self.rng.gen_range(0.0..size))
    }

    /// Spawns a parentless organism at a random position with half its
    /// reproduction threshold as energy.
    pub fn spawn_random_organism(&mut self) -> Option<usize> {
        let traits = genetics::random_traits(&mut self.rng);
        let size = self.world.size;
        let launch = traits[Trait::Speed] * 0.5;
        let record = OrganismRecord {
            x: self.rng.gen_range(0.0..size),
            y: self.rng.gen_range(0.0..size),
            vx: self.rng.gen_range(-1.0..=1.0) * launch,
            vy: self.rng.gen_range(-1.0..=1.0) * launch,
            energy: traits[Trait::ReproThreshold] * 0.5,
            traits,
        };
        self.spawn_organism(&record)
    }

    /// Places `record` with its position wrapped and traits brought into
    /// range. `None` when the store is full.
    pub fn spawn_organism(&mut self, record: &OrganismRecord) -> Option<usize> {
        let mut record = *record;
        record.x = torus::wrap(record.x, self.world.size);
        record.y = torus::wrap(record.y, self.world.size);
        genetics::normalize_all(&mut record.traits);
        self.organisms.spawn(&record, 0, self.step)
    }

    pub fn spawn_food(&mut self, x: f64, y: f64) -> Option<usize> {
        let size = self.world.size;
        self.food.spawn(torus::wrap(x, size), torus::wrap(y, size))
    }

    pub fn kill_organism(&mut self, idx: usize) -> bool {
        self.organisms.kill(idx)
    }

    /// Empties both stores. Zones, settings and counters are kept.
    pub fn reset_stores(&mut self) {
        self.organisms.reset();
        self.food.reset();
        self.organism_grid.clear();
        self.food_grid.clear();
        self.extinct_ticks = 0;
    }

    /// Starts over with fresh zones, statistics and initial population under
    /// the current settings. The RNG stream continues.
    pub fn reset(&mut self) {
        self.reset_stores();
        self.zones.clear();
        self.stats.reset();
        self.metrics.reset();
        self.tick = 0;
        self.step = 0;
        self.populate();
        tracing::info!(organisms = self.organisms.len(), "Simulation reset");
    }

    /// Replaces the tunables after validating them.
    pub fn set_config(&mut self, config: SimConfig) -> anyhow::Result<()> {
        config.validate()?;
        let resize = config.cell_size != self.config.cell_size;
        self.config = config;
        if resize {
            self.resize_grids();
        }
        Ok(())
    }

    /// Replaces the world settings, re-wrapping every entity if the size
    /// changed.
    pub fn set_world(&mut self, world: WorldSettings) -> anyhow::Result<()> {
        anyhow::ensure!(
            world.size.is_finite() && world.size > 0.0,
            "World size must be positive"
        );
        let size_changed = world.size != self.world.size;
        self.world = world;
        if size_changed {
            self.apply_world_size();
        }
        Ok(())
    }

    pub fn set_world_size(&mut self, size: f64) -> anyhow::Result<()> {
        let world = WorldSettings {
            size,
            ..self.world
        };
        self.set_world(world)
    }

    fn apply_world_size(&mut self) {
        let size = self.world.size;
        for idx in 0..self.organisms.capacity() {
            if self.organisms.is_active(idx) {
                self.organisms.x[idx] = torus::wrap(self.organisms.x[idx], size);
                self.organisms.y[idx] = torus::wrap(self.organisms.y[idx], size);
            }
        }
        for idx in 0..self.food.capacity() {
            if self.food.is_active(idx) {
                self.food.x[idx] = torus::wrap(self.food.x[idx], size);
                self.food.y[idx] = torus::wrap(self.food.y[idx], size);
            }
        }
        for zone in &mut self.zones.zones {
            zone.pos.x = torus::wrap(zone.pos.x, size);
            zone.pos.y = torus::wrap(zone.pos.y, size);
        }
        self.resize_grids();
    }

    fn resize_grids(&mut self) {
        self.organism_grid
            .resize(self.world.size, self.config.cell_size);
        self.food_grid.resize(self.world.size, self.config.cell_size);
    }

    pub fn reseed_rng(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn sample_stats(&mut self) {
        self.stats.sample(&self.organisms, self.food.len());
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.organisms.len()
    }

    #[must_use]
    pub fn food_count(&self) -> usize {
        self.food.len()
    }

    #[must_use]
    pub fn organism_grid(&self) -> &SpatialGrid {
        &self.organism_grid
    }

    #[must_use]
    pub fn food_grid(&self) -> &SpatialGrid {
        &self.food_grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SimConfig {
        SimConfig {
            seed: Some(seed),
            initial_population: 40,
            initial_food: 100,
            ..Default::default()
        }
    }

    fn small_world() -> WorldSettings {
        WorldSettings {
            size: 800.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_seeds_initial_entities() {
        let sim = Simulation::with_capacity(seeded(1), small_world(), 500, 1000).unwrap();
        assert_eq!(sim.population(), 40);
        assert_eq!(sim.food_count(), 100);
        assert!(sim.organisms.iter_active().all(|i| genetics::in_range(&sim.organisms.traits_of(i))));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let bad = SimConfig {
            mutation_chance: 2.0,
            ..Default::default()
        };
        assert!(Simulation::with_capacity(bad, small_world(), 10, 10).is_err());

        let world = WorldSettings {
            size: 0.0,
            ..Default::default()
        };
        assert!(Simulation::with_capacity(seeded(1), world, 10, 10).is_err());
    }

    #[test]
    fn test_tick_runs_sim_speed_substeps() {
        let mut world = small_world();
        world.sim_speed = 3;
        let mut sim = Simulation::with_capacity(seeded(2), world, 500, 1000).unwrap();
        sim.tick();
        assert_eq!(sim.tick_count(), 1);
        assert_eq!(sim.step_count(), 3);
        assert_eq!(sim.metrics.tick_count(), 1);
    }

    #[test]
    fn test_zones_drift_once_per_tick_at_any_speed() {
        let mut world = small_world();
        world.sim_speed = 5;
        let config = SimConfig {
            zone_max_drift: 2.0,
            ..seeded(13)
        };
        let mut sim = Simulation::with_capacity(config, world, 500, 1000).unwrap();
        sim.tick();
        assert!(!sim.zones.is_empty());

        for _ in 0..10 {
            let before = sim.zones.zones.clone();
            sim.tick();
            for (old, new) in before.iter().zip(&sim.zones.zones) {
                let dx = torus::delta(old.pos.x, new.pos.x, sim.world.size);
                let dy = torus::delta(old.pos.y, new.pos.y, sim.world.size);
                assert!((dx - old.vel.x).abs() < 1e-9, "moved {dx}, vel {}", old.vel.x);
                assert!((dy - old.vel.y).abs() < 1e-9, "moved {dy}, vel {}", old.vel.y);
            }
        }
    }

    #[test]
    fn test_zero_speed_pauses_behavior() {
        let mut world = small_world();
        world.sim_speed = 0;
        let mut sim = Simulation::with_capacity(seeded(3), world, 500, 1000).unwrap();
        let before: Vec<f64> = sim.organisms.x.clone();
        sim.tick();
        assert_eq!(sim.step_count(), 0);
        assert_eq!(sim.organisms.x, before);
    }

    #[test]
    fn test_food_respects_max_food() {
        let config = SimConfig {
            max_food: 120,
            food_spawn_rate: 50.0,
            initial_population: 0,
            reseed_count: 0,
            ..seeded(4)
        };
        let mut sim = Simulation::with_capacity(config, small_world(), 10, 1000).unwrap();
        for _ in 0..10 {
            sim.tick();
        }
        assert_eq!(sim.food_count(), 120);
    }

    #[test]
    fn test_fractional_spawn_rate_averages_out() {
        let config = SimConfig {
            food_spawn_rate: 0.5,
            initial_population: 0,
            initial_food: 0,
            reseed_count: 0,
            ..seeded(5)
        };
        let mut sim = Simulation::with_capacity(config, small_world(), 10, 5000).unwrap();
        for _ in 0..2000 {
            sim.tick();
        }
        let n = sim.food_count() as f64;
        assert!((800.0..1200.0).contains(&n), "got {n}");
    }

    #[test]
    fn test_extinction_triggers_reseed_after_delay() {
        let config = SimConfig {
            initial_population: 0,
            reseed_count: 5,
            reseed_delay: 3,
            ..seeded(6)
        };
        let mut sim = Simulation::with_capacity(config, small_world(), 100, 1000).unwrap();
        sim.tick();
        sim.tick();
        assert_eq!(sim.population(), 0);
        sim.tick();
        assert_eq!(sim.population(), 5);
    }

    #[test]
    fn test_stats_sampled_on_interval() {
        let config = SimConfig {
            stats_interval: 2,
            ..seeded(7)
        };
        let mut sim = Simulation::with_capacity(config, small_world(), 500, 1000).unwrap();
        sim.tick();
        assert_eq!(sim.stats.samples, 0);
        sim.tick();
        assert_eq!(sim.stats.samples, 1);
        assert_eq!(sim.stats.population, sim.population());
    }

    #[test]
    fn test_spawn_organism_wraps_and_normalizes() {
        let mut sim = Simulation::with_capacity(seeded(8), small_world(), 100, 100).unwrap();
        let mut record = OrganismRecord {
            x: -10.0,
            y: 810.0,
            energy: 5.0,
            ..Default::default()
        };
        record.traits[Trait::Size] = 99.0;
        record.traits[Trait::Hue] = 370.0;
        let idx = sim.spawn_organism(&record).unwrap();
        assert!((sim.organisms.x[idx] - 790.0).abs() < 1e-9);
        assert!((sim.organisms.y[idx] - 10.0).abs() < 1e-9);
        assert_eq!(sim.organisms.trait_value(Trait::Size, idx), 20.0);
        assert!((sim.organisms.trait_value(Trait::Hue, idx) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_spawn_returns_none_when_full() {
        let config = SimConfig {
            initial_population: 0,
            ..seeded(9)
        };
        let mut sim = Simulation::with_capacity(config, small_world(), 2, 10).unwrap();
        assert!(sim.spawn_random_organism().is_some());
        assert!(sim.spawn_random_organism().is_some());
        assert!(sim.spawn_random_organism().is_none());
        assert_eq!(sim.population(), 2);
    }

    #[test]
    fn test_shrinking_world_rewraps_entities() {
        let mut sim = Simulation::with_capacity(seeded(10), small_world(), 500, 1000).unwrap();
        sim.set_world_size(300.0).unwrap();
        assert!(sim.organisms.iter_active().all(|i| sim.organisms.x[i] < 300.0));
        assert!(sim.food.iter_active().all(|i| sim.food.y[i] < 300.0));
        assert!(sim.set_world_size(-1.0).is_err());
        assert_eq!(sim.world.size, 300.0);
    }

    #[test]
    fn test_reset_restores_initial_counts() {
        let mut sim = Simulation::with_capacity(seeded(11), small_world(), 500, 1000).unwrap();
        for _ in 0..20 {
            sim.tick();
        }
        sim.reset();
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.population(), 40);
        assert_eq!(sim.food_count(), 100);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let mut a = Simulation::with_capacity(seeded(12), small_world(), 500, 1000).unwrap();
        let mut b = Simulation::with_capacity(seeded(12), small_world(), 500, 1000).unwrap();
        for _ in 0..50 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.population(), b.population());
        assert_eq!(a.organisms.x, b.organisms.x);
        assert_eq!(a.food.y, b.food.y);
    }
}
