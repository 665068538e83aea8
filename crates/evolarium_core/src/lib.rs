//! # Evolarium Core
//!
//! The simulation engine for Evolarium, a toroidal world of organisms that
//! forage, hunt, dodge drifting hazards and pass mutated traits to their
//! offspring.
//!
//! This crate contains the deterministic simulation logic, including:
//! - Fixed-capacity structure-of-arrays stores with O(1) slot reuse
//! - A uniform toroidal grid rebuilt before every sub-step
//! - The per-organism behavior step (sensing, steering, feeding, predation, reproduction)
//! - Trait genetics and drifting hazard zones
//! - Trait histograms, tick metrics and structured logging
//!
//! ## Example
//!
//! ```
//! use evolarium_core::{SimConfig, Simulation};
//! use evolarium_data::WorldSettings;
//!
//! let config = SimConfig {
//!     seed: Some(7),
//!     initial_population: 30,
//!     initial_food: 60,
//!     ..Default::default()
//! };
//! let mut sim = Simulation::with_capacity(config, WorldSettings::default(), 1000, 2000).unwrap();
//! for _ in 0..10 {
//!     sim.tick();
//! }
//! assert!(sim.population() <= 1000);
//! ```

/// Energy, sensing, steering, feeding, predation and reproduction
pub mod behavior;
/// Configuration management for simulation tunables
pub mod config;
/// Drifting hazard zones
pub mod environment;
/// Trait ranges, sampling and mutation
pub mod genetics;
/// Tick metrics and logging setup
pub mod metrics;
/// The simulation context and tick loop
pub mod simulation;
/// Uniform toroidal grid for neighbor queries
pub mod spatial_grid;
/// Per-trait histograms
pub mod stats;
/// Fixed-capacity organism and food storage
pub mod store;
/// Toroidal coordinate helpers
pub mod torus;

pub use behavior::StepEvents;
pub use config::SimConfig;
pub use environment::EnvironmentZones;
pub use metrics::{init_logging, log_filter, TickMetrics};
pub use simulation::Simulation;
pub use spatial_grid::SpatialGrid;
pub use stats::{TraitHistogram, TraitHistograms, HISTOGRAM_BINS};
pub use store::{FoodStore, OrganismStore, SlotAllocator, MAX_FOOD, MAX_ORGANISMS};
