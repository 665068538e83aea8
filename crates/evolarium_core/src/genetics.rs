//! Trait ranges, initial sampling and mutation.

use crate::config::SimConfig;
use evolarium_data::{Trait, TraitSet, TRAIT_COUNT};
use rand::Rng;

/// Declared bounds and mutation behavior of one trait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitSpec {
    pub min: f64,
    pub max: f64,
    /// Sub-range sampled for organisms with no parent.
    pub init_min: f64,
    pub init_max: f64,
    /// Mutation magnitude before scaling by `SimConfig::mutation_rate`.
    pub mutation_scale: f64,
    /// Wrapping traits live in `[min, max)` and wrap instead of clamping.
    pub wraps: bool,
}

impl TraitSpec {
    const fn clamped(min: f64, max: f64, init_min: f64, init_max: f64, scale: f64) -> Self {
        Self {
            min,
            max,
            init_min,
            init_max,
            mutation_scale: scale,
            wraps: false,
        }
    }

    /// Brings `v` back into the declared range.
    #[inline]
    #[must_use]
    pub fn normalize(&self, v: f64) -> f64 {
        if self.wraps {
            let span = self.max - self.min;
            self.min + crate::torus::wrap(v - self.min, span)
        } else {
            v.clamp(self.min, self.max)
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, v: f64) -> bool {
        if self.wraps {
            v >= self.min && v < self.max
        } else {
            v >= self.min && v <= self.max
        }
    }
}

/// Indexed by [`Trait::index`].
pub const TRAIT_SPECS: [TraitSpec; TRAIT_COUNT] = [
    // speed
    TraitSpec::clamped(0.5, 6.0, 1.0, 3.0, 0.5),
    // size
    TraitSpec::clamped(2.0, 20.0, 4.0, 8.0, 1.5),
    // sense
    TraitSpec::clamped(10.0, 200.0, 40.0, 90.0, 10.0),
    // reproduction threshold
    TraitSpec::clamped(50.0, 400.0, 100.0, 180.0, 15.0),
    // wander
    TraitSpec::clamped(0.0, 2.0, 0.1, 0.6, 0.1),
    // defense
    TraitSpec::clamped(0.0, 5.0, 0.0, 0.5, 0.3),
    // metabolism
    TraitSpec::clamped(0.2, 3.0, 0.8, 1.2, 0.1),
    // hue
    TraitSpec {
        min: 0.0,
        max: 360.0,
        init_min: 0.0,
        init_max: 360.0,
        mutation_scale: 30.0,
        wraps: true,
    },
];

#[inline]
#[must_use]
pub fn spec(t: Trait) -> &'static TraitSpec {
    &TRAIT_SPECS[t.index()]
}

/// Samples traits for an organism with no parent.
pub fn random_traits<R: Rng>(rng: &mut R) -> TraitSet {
    let mut traits = TraitSet::default();
    for t in Trait::ALL {
        let s = spec(t);
        let v = if s.wraps {
            rng.gen_range(s.init_min..s.init_max)
        } else {
            rng.gen_range(s.init_min..=s.init_max)
        };
        traits.set(t, v);
    }
    traits
}

/// Copies `parent` and mutates the copy.
pub fn inherit<R: Rng>(parent: &TraitSet, config: &SimConfig, rng: &mut R) -> TraitSet {
    let mut child = *parent;
    mutate(&mut child, config, rng);
    child
}

/// Applies an independent mutation gate to every trait, then normalizes all
/// of them so the set is always in range afterwards.
pub fn mutate<R: Rng>(traits: &mut TraitSet, config: &SimConfig, rng: &mut R) {
    for t in Trait::ALL {
        let s = spec(t);
        let mut v = traits.get(t);
        if rng.gen::<f64>() < config.mutation_chance {
            v += rng.gen_range(-1.0..=1.0) * config.mutation_rate * s.mutation_scale;
        }
        traits.set(t, s.normalize(v));
    }
}

/// Normalizes every trait without mutating. Used for imported records.
pub fn normalize_all(traits: &mut TraitSet) {
    for t in Trait::ALL {
        let v = spec(t).normalize(traits.get(t));
        traits.set(t, v);
    }
}

#[must_use]
pub fn in_range(traits: &TraitSet) -> bool {
    traits.iter().all(|(t, v)| spec(t).contains(v))
}
