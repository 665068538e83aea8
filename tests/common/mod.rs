pub mod macros;

use evolarium_data::{OrganismRecord, Trait, TraitSet, WorldSettings};
use evolarium_lib::{SimConfig, Simulation};

/// Builds a seeded simulation with nothing in it unless asked.
#[allow(dead_code)]
pub struct SimBuilder {
    config: SimConfig,
    world: WorldSettings,
    organism_capacity: usize,
    food_capacity: usize,
    organisms: Vec<OrganismRecord>,
    food: Vec<(f64, f64)>,
}

#[allow(dead_code)]
impl SimBuilder {
    pub fn new() -> Self {
        let config = SimConfig {
            seed: Some(0),
            initial_population: 0,
            initial_food: 0,
            food_spawn_rate: 0.0,
            reseed_count: 0,
            ..Default::default()
        };
        Self {
            config,
            world: WorldSettings::default(),
            organism_capacity: 2_000,
            food_capacity: 4_000,
            organisms: Vec::new(),
            food: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_world<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut WorldSettings),
    {
        modifier(&mut self.world);
        self
    }

    pub fn with_capacity(mut self, organisms: usize, food: usize) -> Self {
        self.organism_capacity = organisms;
        self.food_capacity = food;
        self
    }

    pub fn with_organism(mut self, record: OrganismRecord) -> Self {
        self.organisms.push(record);
        self
    }

    pub fn with_food(mut self, x: f64, y: f64) -> Self {
        self.food.push((x, y));
        self
    }

    pub fn build(self) -> Simulation {
        let mut sim = Simulation::with_capacity(
            self.config,
            self.world,
            self.organism_capacity,
            self.food_capacity,
        )
        .expect("Failed to create simulation in test builder");
        for record in &self.organisms {
            sim.spawn_organism(record);
        }
        for &(x, y) in &self.food {
            sim.spawn_food(x, y);
        }
        sim
    }
}

/// A motionless organism with mid-range traits and no wander.
#[allow(dead_code)]
pub fn organism_at(x: f64, y: f64, energy: f64) -> OrganismRecord {
    let mut traits = TraitSet::default();
    traits[Trait::Speed] = 2.0;
    traits[Trait::Size] = 5.0;
    traits[Trait::Sense] = 60.0;
    traits[Trait::ReproThreshold] = 150.0;
    traits[Trait::Wander] = 0.0;
    traits[Trait::Defense] = 0.0;
    traits[Trait::Metabolism] = 1.0;
    traits[Trait::Hue] = 120.0;
    OrganismRecord {
        x,
        y,
        vx: 0.0,
        vy: 0.0,
        energy,
        traits,
    }
}
