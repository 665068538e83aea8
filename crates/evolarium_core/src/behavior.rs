//! Per-organism energy, sensing, steering, interaction and reproduction.
//!
//! One call to [`run_step`] advances every living organism by one sub-step in
//! ascending slot order. Organisms born during the step are skipped until the
//! next one.

use crate::config::SimConfig;
use crate::environment::EnvironmentZones;
use crate::genetics;
use crate::spatial_grid::SpatialGrid;
use crate::store::{FoodStore, OrganismStore};
use crate::torus;
use evolarium_data::{OrganismRecord, Trait, WorldSettings};
use rand::Rng;

/// Speed cap as a multiple of the metabolism trait.
pub const METABOLIC_SPEED_FACTOR: f64 = 4.0;
pub const SPEED_COST: f64 = 0.002;
pub const SIZE_COST: f64 = 0.000_05;
pub const SENSE_COST: f64 = 0.000_2;
pub const DEFENSE_COST: f64 = 0.02;
/// Energy spent per step while fleeing.
pub const FLEE_TAX: f64 = 0.05;
pub const PURSUIT_GAIN: f64 = 0.25;
/// Velocity multiplier applied once within two body sizes of a target.
pub const ARRIVAL_DAMPING: f64 = 0.8;
pub const EAT_RADIUS_FACTOR: f64 = 1.5;
/// Feeding cannot lift energy past this multiple of the reproduction threshold.
pub const FEED_CAP_FACTOR: f64 = 1.2;
pub const BITE_STRENGTH: f64 = 1.5;
pub const PREDATION_EFFICIENCY: f64 = 0.5;
pub const PREY_SIZE_BONUS: f64 = 2.0;
/// Predation cannot lift energy past this multiple of the reproduction threshold.
pub const PREDATION_CAP_FACTOR: f64 = 1.5;
pub const MAX_OFFSPRING: usize = 8;
/// `(minimum parent energy, energy cost per child)`, richest tier first.
pub const CHILD_COST_TIERS: [(f64, f64); 3] = [(800.0, 80.0), (400.0, 100.0), (200.0, 120.0)];
pub const BASE_CHILD_COST: f64 = 150.0;
/// Offspring appear within this many parent sizes of the parent.
pub const BIRTH_SCATTER: f64 = 2.0;

const MIN_DISTANCE: f64 = 1e-9;

/// Everything a behavior step reads but does not own.
pub struct StepContext<'a> {
    pub config: &'a SimConfig,
    pub world: &'a WorldSettings,
    pub zones: &'a EnvironmentZones,
    pub organism_grid: &'a SpatialGrid,
    pub food_grid: &'a SpatialGrid,
    /// Sub-step counter; organisms with this `born_step` are skipped.
    pub step: u64,
}

/// Tallies produced by one or more behavior steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEvents {
    pub births: u64,
    /// Offspring that could not be placed because the store was full.
    pub births_dropped: u64,
    /// Deaths from energy exhaustion.
    pub starvations: u64,
    pub kills: u64,
    pub food_eaten: u64,
}

impl StepEvents {
    pub fn merge(&mut self, other: &StepEvents) {
        self.births += other.births;
        self.births_dropped += other.births_dropped;
        self.starvations += other.starvations;
        self.kills += other.kills;
        self.food_eaten += other.food_eaten;
    }
}

/// Per-step energy upkeep excluding hazards.
#[inline]
#[must_use]
pub fn upkeep(config: &SimConfig, current_speed: f64, size: f64, sense: f64, defense: f64) -> f64 {
    config.base_metabolism
        + SPEED_COST * current_speed * current_speed * current_speed
        + SIZE_COST * size * size * size
        + SENSE_COST * sense
        + DEFENSE_COST * defense
}

/// Energy each child costs at the given parent energy.
#[inline]
#[must_use]
pub fn child_cost(energy: f64) -> f64 {
    for &(min_energy, cost) in &CHILD_COST_TIERS {
        if energy >= min_energy {
            return cost;
        }
    }
    BASE_CHILD_COST
}

/// Offspring a parent with `energy` attempts to produce.
#[inline]
#[must_use]
pub fn offspring_count(energy: f64) -> usize {
    let n = (energy / child_cost(energy)).floor();
    if n.is_finite() && n > 1.0 {
        (n as usize).min(MAX_OFFSPRING)
    } else {
        1
    }
}

#[derive(Clone, Copy)]
struct Sighting {
    dx: f64,
    dy: f64,
    dist_sq: f64,
}

impl Sighting {
    #[inline]
    fn closer(a: Option<Sighting>, b: Option<Sighting>) -> Option<Sighting> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.dist_sq < a.dist_sq { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

#[derive(Default)]
struct Senses {
    food: Option<Sighting>,
    predator: Option<Sighting>,
    prey: Option<Sighting>,
}

/// Advances every living organism by one sub-step.
pub fn run_step<R: Rng>(
    ctx: &StepContext,
    organisms: &mut OrganismStore,
    food: &mut FoodStore,
    rng: &mut R,
    events: &mut StepEvents,
) {
    for i in 0..organisms.capacity() {
        if !organisms.is_active(i) || organisms.born_step[i] == ctx.step {
            continue;
        }
        step_organism(ctx, i, organisms, food, rng, events);
    }
}

fn step_organism<R: Rng>(
    ctx: &StepContext,
    i: usize,
    organisms: &mut OrganismStore,
    food: &mut FoodStore,
    rng: &mut R,
    events: &mut StepEvents,
) {
    let cfg = ctx.config;
    let world = ctx.world.size;

    let speed = organisms.trait_value(Trait::Speed, i);
    let size = organisms.trait_value(Trait::Size, i);
    let sense = organisms.trait_value(Trait::Sense, i);
    let repro = organisms.trait_value(Trait::ReproThreshold, i);
    let wander = organisms.trait_value(Trait::Wander, i);
    let defense = organisms.trait_value(Trait::Defense, i);
    let metabolism = organisms.trait_value(Trait::Metabolism, i);

    let mut x = organisms.x[i];
    let mut y = organisms.y[i];
    let mut vx = organisms.vx[i];
    let mut vy = organisms.vy[i];
    let mut energy = organisms.energy[i];

    // 1. Metabolic speed limit.
    torus::clamp_magnitude(&mut vx, &mut vy, metabolism * METABOLIC_SPEED_FACTOR);

    // 2. Upkeep and hazards.
    let current_speed = (vx * vx + vy * vy).sqrt();
    energy -= upkeep(cfg, current_speed, size, sense, defense);
    if ctx.world.flags.zones {
        energy -= ctx.zones.toxicity_at(x, y, defense, cfg, world);
    }

    // 3. Starvation.
    if energy <= 0.0 {
        organisms.energy[i] = energy;
        organisms.kill(i);
        events.starvations += 1;
        return;
    }

    // 4. Sensing.
    let senses = sense_surroundings(ctx, i, x, y, size, sense, organisms, food);

    // 5. Steering.
    let (mut ax, mut ay) = (0.0, 0.0);
    if let Some(threat) = senses.predator {
        let d = threat.dist_sq.sqrt().max(MIN_DISTANCE);
        ax = -threat.dx / d * speed;
        ay = -threat.dy / d * speed;
        energy -= FLEE_TAX;
        if energy <= 0.0 {
            organisms.energy[i] = energy;
            organisms.kill(i);
            events.starvations += 1;
            return;
        }
    } else if let Some(target) = Sighting::closer(senses.food, senses.prey) {
        let d = target.dist_sq.sqrt();
        if d > MIN_DISTANCE {
            ax = target.dx / d * speed * PURSUIT_GAIN;
            ay = target.dy / d * speed * PURSUIT_GAIN;
        }
        if d < 2.0 * size {
            vx *= ARRIVAL_DAMPING;
            vy *= ARRIVAL_DAMPING;
        }
    } else {
        ax = rng.gen_range(-1.0..=1.0) * wander;
        ay = rng.gen_range(-1.0..=1.0) * wander;
    }

    // 6. Integration.
    vx += ax;
    vy += ay;
    torus::clamp_magnitude(&mut vx, &mut vy, speed);
    x = torus::wrap(x + vx, world);
    y = torus::wrap(y + vy, world);

    organisms.x[i] = x;
    organisms.y[i] = y;
    organisms.vx[i] = vx;
    organisms.vy[i] = vy;

    // 7. Feeding and predation within the current cell.
    let feed_cap = repro * FEED_CAP_FACTOR;
    let eat_radius = size * EAT_RADIUS_FACTOR;
    let eat_radius_sq = eat_radius * eat_radius;
    ctx.food_grid.for_each_in_cell(x, y, |f| {
        if !food.is_active(f) {
            return;
        }
        if torus::distance_sq(x, y, food.x[f], food.y[f], world) <= eat_radius_sq {
            food.remove(f);
            events.food_eaten += 1;
            if energy < feed_cap {
                energy = (energy + cfg.food_value).min(feed_cap);
            }
        }
    });

    if ctx.world.flags.predation {
        let advantage = cfg.predator_size_advantage;
        let hunt_cap = repro * PREDATION_CAP_FACTOR;
        let bite = size * BITE_STRENGTH;
        ctx.organism_grid.for_each_in_cell(x, y, |j| {
            if j == i || !organisms.is_active(j) || organisms.born_step[j] == ctx.step {
                return;
            }
            let victim_size = organisms.trait_value(Trait::Size, j);
            if size <= victim_size * advantage {
                return;
            }
            let (jx, jy) = (organisms.x[j], organisms.y[j]);
            let reach = size + victim_size;
            if torus::distance_sq(x, y, jx, jy, world) > reach * reach {
                return;
            }
            let damage = (bite - organisms.trait_value(Trait::Defense, j)).max(0.0);
            if damage <= 0.0 {
                return;
            }
            let victim_energy = organisms.energy[j];
            organisms.energy[j] = victim_energy - damage;
            if organisms.energy[j] <= 0.0 {
                let gain = PREDATION_EFFICIENCY * victim_energy.max(0.0) + size * PREY_SIZE_BONUS;
                if energy < hunt_cap {
                    energy = (energy + gain).min(hunt_cap);
                }
                organisms.kill(j);
                events.kills += 1;
                // The carcass stays behind as food; dropped silently when full.
                let _ = food.spawn(jx, jy);
            }
        });
    }

    organisms.energy[i] = energy;

    // 8. Reproduction.
    if energy > repro {
        reproduce(ctx, i, organisms, rng, events);
    }
}

#[allow(clippy::too_many_arguments)]
fn sense_surroundings(
    ctx: &StepContext,
    i: usize,
    x: f64,
    y: f64,
    size: f64,
    sense: f64,
    organisms: &OrganismStore,
    food: &FoodStore,
) -> Senses {
    let world = ctx.world.size;
    let sense_sq = sense * sense;
    let mut senses = Senses::default();

    ctx.food_grid.for_each_neighbor(x, y, |f| {
        if !food.is_active(f) {
            return;
        }
        let dx = torus::delta(x, food.x[f], world);
        let dy = torus::delta(y, food.y[f], world);
        let dist_sq = dx * dx + dy * dy;
        if dist_sq <= sense_sq && senses.food.map_or(true, |s| dist_sq < s.dist_sq) {
            senses.food = Some(Sighting {
                dx,
                dy,
                dist_sq,
            });
        }
    });

    if !ctx.world.flags.predation {
        return senses;
    }

    let advantage = ctx.config.predator_size_advantage;
    ctx.organism_grid.for_each_neighbor(x, y, |j| {
        if j == i || !organisms.is_active(j) || organisms.born_step[j] == ctx.step {
            return;
        }
        let dx = torus::delta(x, organisms.x[j], world);
        let dy = torus::delta(y, organisms.y[j], world);
        let dist_sq = dx * dx + dy * dy;
        if dist_sq > sense_sq {
            return;
        }
        let other_size = organisms.trait_value(Trait::Size, j);
        let seen = Some(Sighting {
            dx,
            dy,
            dist_sq,
        });
        if other_size > size * advantage {
            senses.predator = Sighting::closer(senses.predator, seen);
        } else if size > other_size * advantage {
            senses.prey = Sighting::closer(senses.prey, seen);
        }
    });

    senses
}

fn reproduce<R: Rng>(
    ctx: &StepContext,
    parent: usize,
    organisms: &mut OrganismStore,
    rng: &mut R,
    events: &mut StepEvents,
) {
    let energy = organisms.energy[parent];
    let wanted = offspring_count(energy);
    let parent_traits = organisms.traits_of(parent);
    let generation = organisms.generation[parent].saturating_add(1);
    let (px, py) = (organisms.x[parent], organisms.y[parent]);
    let scatter = parent_traits[Trait::Size] * BIRTH_SCATTER;
    let world = ctx.world.size;

    let mut children = [0usize; MAX_OFFSPRING];
    let mut born = 0;
    for _ in 0..wanted {
        if organisms.free_count() == 0 {
            break;
        }
        let traits = genetics::inherit(&parent_traits, ctx.config, rng);
        let launch = traits[Trait::Speed] * 0.5;
        let record = OrganismRecord {
            x: torus::wrap(px + rng.gen_range(-1.0..=1.0) * scatter, world),
            y: torus::wrap(py + rng.gen_range(-1.0..=1.0) * scatter, world),
            vx: rng.gen_range(-1.0..=1.0) * launch,
            vy: rng.gen_range(-1.0..=1.0) * launch,
            energy: 0.0,
            traits,
        };
        if let Some(child) = organisms.spawn(&record, generation, ctx.step) {
            children[born] = child;
            born += 1;
        }
    }

    events.births_dropped += (wanted - born) as u64;
    if born == 0 {
        return;
    }
    events.births += born as u64;

    let share = energy / (born + 1) as f64;
    organisms.energy[parent] = share;
    for &child in &children[..born] {
        organisms.energy[child] = share;
    }
}
