//! # Evolarium
//!
//! Facade over the workspace crates plus the headless run driver used by the
//! `evolarium` binary.

pub mod runner;

pub use evolarium_core as engine;
pub use evolarium_data as data;
pub use evolarium_io as io;

pub use evolarium_core::{SimConfig, Simulation};
pub use evolarium_data::WorldSettings;
