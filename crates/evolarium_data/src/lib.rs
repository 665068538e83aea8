//! Plain data shared by the engine, the persistence codec and external
//! collaborators (renderers, config panels).

pub mod organism;
pub mod traits;
pub mod world;

pub use organism::{OrganismRecord, ORGANISM_FIELDS};
pub use traits::{Trait, TraitSet, TRAIT_COUNT};
pub use world::{Camera, Vec2, WorldFlags, WorldSettings, Zone};
