//! Configuration management for simulation tunables.
//!
//! `SimConfig` is a flat key/value record so it can be edited live by a
//! config panel, loaded from `config.toml`, and copied verbatim into the
//! `config` section of a snapshot.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! mutation_rate = 0.5
//! mutation_chance = 0.1
//! base_metabolism = 0.05
//! food_value = 30.0
//! predator_size_advantage = 1.2
//! max_toxicity = 1.5
//! zone_density = 2.0
//! zone_max_drift = 0.6
//! zone_size = 1.0
//! food_spawn_rate = 3.0
//! max_food = 2000
//! initial_population = 300
//! initial_food = 800
//! cell_size = 100.0
//! reseed_count = 20
//! reseed_delay = 60
//! stats_interval = 30
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};

/// Missing keys fall back to their defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Mutation magnitude as a fraction of each trait's mutation scale.
    pub mutation_rate: f64,
    /// Per-trait probability that an offspring's trait mutates at all.
    pub mutation_chance: f64,
    /// Flat energy cost paid by every organism each step.
    pub base_metabolism: f64,
    /// Energy gained per food pellet.
    pub food_value: f64,
    /// Size ratio required before one organism can prey on another.
    pub predator_size_advantage: f64,
    /// Damage at the center of a hazard zone before defense.
    pub max_toxicity: f64,
    /// Zones per reference area (1000 x 1000 world units).
    pub zone_density: f64,
    pub zone_max_drift: f64,
    /// Multiplier applied to newly created zone radii.
    pub zone_size: f64,
    /// Expected food pellets spawned per sub-step.
    pub food_spawn_rate: f64,
    /// Random spawning stops once this many pellets exist.
    pub max_food: usize,
    pub initial_population: usize,
    pub initial_food: usize,
    /// Preferred spatial grid cell edge; the grid dimension is capped.
    pub cell_size: f64,
    /// Organisms respawned after a total extinction. Zero disables recovery.
    pub reseed_count: usize,
    /// Ticks of zero population before recovery kicks in.
    pub reseed_delay: u64,
    /// Ticks between histogram samples. Zero disables sampling.
    pub stats_interval: u64,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.5,
            mutation_chance: 0.1,
            base_metabolism: 0.05,
            food_value: 30.0,
            predator_size_advantage: 1.2,
            max_toxicity: 1.5,
            zone_density: 2.0,
            zone_max_drift: 0.6,
            zone_size: 1.0,
            food_spawn_rate: 3.0,
            max_food: 2000,
            initial_population: 300,
            initial_food: 800,
            cell_size: 100.0,
            reseed_count: 20,
            reseed_delay: 60,
            stats_interval: 30,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // Evolution
        anyhow::ensure!(
            self.mutation_rate.is_finite() && self.mutation_rate >= 0.0,
            "Mutation rate must be non-negative"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.mutation_chance),
            "Mutation chance must be in [0.0, 1.0]"
        );

        // Energy
        anyhow::ensure!(
            self.base_metabolism.is_finite() && self.base_metabolism > 0.0,
            "Base metabolism must be positive"
        );
        anyhow::ensure!(
            self.food_value.is_finite() && self.food_value >= 0.0,
            "Food value must be non-negative"
        );
        anyhow::ensure!(
            self.predator_size_advantage.is_finite() && self.predator_size_advantage >= 1.0,
            "Predator size advantage must be at least 1.0"
        );

        // Hazards
        anyhow::ensure!(
            self.max_toxicity.is_finite() && self.max_toxicity >= 0.0,
            "Max toxicity must be non-negative"
        );
        anyhow::ensure!(
            self.zone_density.is_finite() && self.zone_density >= 0.0,
            "Zone density must be non-negative"
        );
        anyhow::ensure!(
            self.zone_max_drift.is_finite() && self.zone_max_drift >= 0.0,
            "Zone drift must be non-negative"
        );
        anyhow::ensure!(
            self.zone_size.is_finite() && self.zone_size > 0.0,
            "Zone size must be positive"
        );

        // Food
        anyhow::ensure!(
            self.food_spawn_rate.is_finite() && self.food_spawn_rate >= 0.0,
            "Food spawn rate must be non-negative"
        );

        // Grid
        anyhow::ensure!(
            self.cell_size.is_finite() && self.cell_size > 0.0,
            "Cell size must be positive"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Stable digest of the tunables that affect simulation outcomes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self).as_bytes());
        hex::encode(hasher.finalize())
    }
}
