//! Export and import of whole simulations.
//!
//! Export copies live state into an owned [`SnapshotDocument`]. Import checks
//! the entire document before it touches the simulation, so a rejected
//! document leaves the running world exactly as it was.

use crate::document::{EntitiesSection, EnvironmentSection, Meta, SnapshotDocument, FOOD_FIELDS};
use crate::error::{IoError, Result};
use crate::serialization;
use evolarium_core::{torus, Simulation};
use evolarium_data::{OrganismRecord, ORGANISM_FIELDS};
use std::path::Path;

/// What an import actually placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub organisms: usize,
    /// Organisms beyond capacity, discarded in document order.
    pub organisms_dropped: usize,
    pub food: usize,
    pub food_dropped: usize,
    pub zones: usize,
}

/// Snapshots every living organism, pellet and zone.
#[must_use]
pub fn export(sim: &Simulation) -> SnapshotDocument {
    let organisms = sim
        .organisms
        .iter_active()
        .filter_map(|i| sim.organisms.record(i))
        .map(|rec| rec.to_tuple().to_vec())
        .collect();
    let food = sim
        .food
        .iter_active()
        .map(|i| vec![sim.food.x[i], sim.food.y[i]])
        .collect();

    SnapshotDocument {
        meta: Meta::now(),
        config: sim.config.clone(),
        world: sim.world,
        environment: EnvironmentSection {
            zones: sim.zones.zones.clone(),
        },
        entities: EntitiesSection { organisms, food },
    }
}

/// Checks everything [`import`] relies on without touching any state.
pub fn validate(doc: &SnapshotDocument) -> Result<()> {
    doc.config
        .validate()
        .map_err(|e| IoError::validation(format!("config: {e}")))?;

    let world = &doc.world;
    if !(world.size.is_finite() && world.size > 0.0) {
        return Err(IoError::validation(format!(
            "world size must be positive, got {}",
            world.size
        )));
    }

    for (i, zone) in doc.environment.zones.iter().enumerate() {
        let values = [zone.pos.x, zone.pos.y, zone.radius, zone.vel.x, zone.vel.y];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(IoError::validation(format!("zone {i} has a non-finite field")));
        }
        if zone.radius < 0.0 {
            return Err(IoError::validation(format!("zone {i} has a negative radius")));
        }
    }

    check_tuples("organism", &doc.entities.organisms, ORGANISM_FIELDS)?;
    check_tuples("food", &doc.entities.food, FOOD_FIELDS)?;
    Ok(())
}

fn check_tuples(kind: &str, tuples: &[Vec<f64>], width: usize) -> Result<()> {
    for (i, tuple) in tuples.iter().enumerate() {
        if tuple.len() != width {
            return Err(IoError::validation(format!(
                "{kind} {i} has {} fields, expected {width}",
                tuple.len()
            )));
        }
        if tuple.iter().any(|v| !v.is_finite()) {
            return Err(IoError::validation(format!(
                "{kind} {i} has a non-finite field"
            )));
        }
    }
    Ok(())
}

/// Replaces the simulation's contents with the document's.
///
/// Stores are emptied and refilled in document order; entities past capacity
/// are dropped. Positions are wrapped into the world and traits clamped into
/// range. Tick counters and metrics carry on.
pub fn import(sim: &mut Simulation, doc: &SnapshotDocument) -> Result<ImportSummary> {
    validate(doc)?;

    sim.set_config(doc.config.clone())
        .map_err(|e| IoError::validation(e.to_string()))?;
    sim.set_world(doc.world)
        .map_err(|e| IoError::validation(e.to_string()))?;
    sim.reset_stores();

    let size = sim.world.size;
    sim.zones.zones = doc.environment.zones.clone();
    for zone in &mut sim.zones.zones {
        zone.pos.x = torus::wrap(zone.pos.x, size);
        zone.pos.y = torus::wrap(zone.pos.y, size);
    }

    let mut summary = ImportSummary {
        zones: sim.zones.len(),
        ..Default::default()
    };

    for tuple in &doc.entities.organisms {
        let placed = OrganismRecord::from_tuple(tuple)
            .and_then(|record| sim.spawn_organism(&record));
        match placed {
            Some(_) => summary.organisms += 1,
            None => summary.organisms_dropped += 1,
        }
    }
    for tuple in &doc.entities.food {
        match sim.spawn_food(tuple[0], tuple[1]) {
            Some(_) => summary.food += 1,
            None => summary.food_dropped += 1,
        }
    }

    if summary.organisms_dropped > 0 || summary.food_dropped > 0 {
        tracing::warn!(
            organisms_dropped = summary.organisms_dropped,
            food_dropped = summary.food_dropped,
            "Snapshot exceeds capacity, truncated"
        );
    }

    sim.sample_stats();
    tracing::info!(
        version = %doc.meta.version,
        organisms = summary.organisms,
        food = summary.food,
        zones = summary.zones,
        "Snapshot imported"
    );
    Ok(summary)
}

/// Exports `sim` and writes it to `path` (gzip when it ends in `.gz`).
pub fn save_to_file<P: AsRef<Path>>(sim: &Simulation, path: P) -> Result<()> {
    serialization::write_file(&export(sim), path)
}

/// Reads a snapshot from `path` and imports it into `sim`.
pub fn load_from_file<P: AsRef<Path>>(sim: &mut Simulation, path: P) -> Result<ImportSummary> {
    let doc: SnapshotDocument = serialization::read_file(path)?;
    import(sim, &doc)
}
