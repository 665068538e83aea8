use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Number of evolvable traits carried by every organism.
pub const TRAIT_COUNT: usize = 8;

/// One evolvable numeric attribute of an organism.
///
/// The discriminant doubles as the column index in the organism store and as
/// the position of the trait inside a persisted organism tuple (offset by 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    Speed,
    Size,
    Sense,
    ReproThreshold,
    Wander,
    Defense,
    Metabolism,
    Hue,
}

impl Trait {
    pub const ALL: [Trait; TRAIT_COUNT] = [
        Trait::Speed,
        Trait::Size,
        Trait::Sense,
        Trait::ReproThreshold,
        Trait::Wander,
        Trait::Defense,
        Trait::Metabolism,
        Trait::Hue,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Trait::Speed => "speed",
            Trait::Size => "size",
            Trait::Sense => "sense",
            Trait::ReproThreshold => "reproThreshold",
            Trait::Wander => "wander",
            Trait::Defense => "defense",
            Trait::Metabolism => "metabolism",
            Trait::Hue => "hue",
        }
    }
}

/// A full set of trait values, indexed by [`Trait`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TraitSet(pub [f64; TRAIT_COUNT]);

impl TraitSet {
    #[inline]
    #[must_use]
    pub fn get(&self, t: Trait) -> f64 {
        self.0[t.index()]
    }

    #[inline]
    pub fn set(&mut self, t: Trait, value: f64) {
        self.0[t.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Trait, f64)> + '_ {
        Trait::ALL.iter().map(move |&t| (t, self.get(t)))
    }
}

impl Index<Trait> for TraitSet {
    type Output = f64;

    fn index(&self, t: Trait) -> &f64 {
        &self.0[t.index()]
    }
}

impl IndexMut<Trait> for TraitSet {
    fn index_mut(&mut self, t: Trait) -> &mut f64 {
        &mut self.0[t.index()]
    }
}
