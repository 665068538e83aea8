//! Drifting circular hazard zones.

use crate::config::SimConfig;
use crate::torus;
use evolarium_data::{Vec2, Zone};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// World area that `zone_density` is expressed against.
pub const REFERENCE_AREA: f64 = 1_000_000.0;
pub const ZONE_MIN_RADIUS: f64 = 60.0;
pub const ZONE_MAX_RADIUS: f64 = 180.0;
/// Per-update probability that a zone changes course.
pub const DRIFT_CHANGE_CHANCE: f64 = 0.005;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EnvironmentZones {
    pub zones: Vec<Zone>,
}

impl EnvironmentZones {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of zones the world should hold for its size and density.
    #[must_use]
    pub fn target_count(config: &SimConfig, world_size: f64) -> usize {
        let raw = config.zone_density * world_size * world_size / REFERENCE_AREA;
        if raw.is_finite() && raw > 0.0 {
            raw.ceil() as usize
        } else {
            0
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    /// Tops the zone list up to its target, then drifts every zone.
    ///
    /// Zones above the target are left alone: shrinking the density or the
    /// world at runtime never removes hazards that already exist.
    pub fn update<R: Rng>(&mut self, config: &SimConfig, world_size: f64, rng: &mut R) {
        let target = Self::target_count(config, world_size);
        while self.zones.len() < target {
            let zone = Self::random_zone(config, world_size, rng);
            self.zones.push(zone);
        }

        let max_drift = config.zone_max_drift.max(0.0);
        for zone in &mut self.zones {
            zone.pos.x = torus::wrap(zone.pos.x + zone.vel.x, world_size);
            zone.pos.y = torus::wrap(zone.pos.y + zone.vel.y, world_size);

            if rng.gen::<f64>() < DRIFT_CHANGE_CHANCE {
                let kick = max_drift * 0.5;
                zone.vel.x = (zone.vel.x + rng.gen_range(-1.0..=1.0) * kick)
                    .clamp(-max_drift, max_drift);
                zone.vel.y = (zone.vel.y + rng.gen_range(-1.0..=1.0) * kick)
                    .clamp(-max_drift, max_drift);
            }
        }
    }

    fn random_zone<R: Rng>(config: &SimConfig, world_size: f64, rng: &mut R) -> Zone {
        let max_drift = config.zone_max_drift.max(0.0);
        Zone {
            pos: Vec2::new(
                rng.gen_range(0.0..world_size),
                rng.gen_range(0.0..world_size),
            ),
            radius: rng.gen_range(ZONE_MIN_RADIUS..=ZONE_MAX_RADIUS) * config.zone_size,
            vel: Vec2::new(
                rng.gen_range(-1.0..=1.0) * max_drift,
                rng.gen_range(-1.0..=1.0) * max_drift,
            ),
        }
    }

    /// Total hazard damage suffered at `(x, y)` by an organism with the given
    /// defense. Each containing zone contributes
    /// `max(0, intensity * max_toxicity - defense)`.
    #[must_use]
    pub fn toxicity_at(
        &self,
        x: f64,
        y: f64,
        defense: f64,
        config: &SimConfig,
        world_size: f64,
    ) -> f64 {
        let mut total = 0.0;
        for zone in &self.zones {
            if zone.radius <= 0.0 {
                continue;
            }
            let d2 = torus::distance_sq(x, y, zone.pos.x, zone.pos.y, world_size);
            if d2 >= zone.radius * zone.radius {
                continue;
            }
            let intensity = 1.0 - d2.sqrt() / zone.radius;
            total += (intensity * config.max_toxicity - defense).max(0.0);
        }
        total
    }
}
