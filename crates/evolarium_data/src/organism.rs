use crate::traits::{Trait, TraitSet, TRAIT_COUNT};
use serde::{Deserialize, Serialize};

/// Width of a persisted organism tuple: position, velocity, energy, traits.
pub const ORGANISM_FIELDS: usize = 5 + TRAIT_COUNT;

/// Value copy of one organism, detached from the store it came from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganismRecord {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub energy: f64,
    pub traits: TraitSet,
}

impl OrganismRecord {
    /// Flattens the record into `[x, y, vx, vy, energy, speed, size, sense,
    /// reproThreshold, wander, defense, metabolism, hue]`.
    #[must_use]
    pub fn to_tuple(&self) -> [f64; ORGANISM_FIELDS] {
        let mut out = [0.0; ORGANISM_FIELDS];
        out[0] = self.x;
        out[1] = self.y;
        out[2] = self.vx;
        out[3] = self.vy;
        out[4] = self.energy;
        out[5..].copy_from_slice(&self.traits.0);
        out
    }

    /// Inverse of [`OrganismRecord::to_tuple`]. Returns `None` unless the
    /// tuple has exactly [`ORGANISM_FIELDS`] fields.
    #[must_use]
    pub fn from_tuple(fields: &[f64]) -> Option<Self> {
        if fields.len() != ORGANISM_FIELDS {
            return None;
        }
        let mut traits = TraitSet::default();
        for t in Trait::ALL {
            traits.set(t, fields[5 + t.index()]);
        }
        Some(Self {
            x: fields[0],
            y: fields[1],
            vx: fields[2],
            vy: fields[3],
            energy: fields[4],
            traits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_layout_puts_traits_after_energy() {
        let mut traits = TraitSet::default();
        traits[Trait::Speed] = 2.0;
        traits[Trait::Hue] = 270.0;
        let rec = OrganismRecord {
            x: 1.0,
            y: 2.0,
            vx: 0.5,
            vy: -0.5,
            energy: 42.0,
            traits,
        };
        let tuple = rec.to_tuple();
        assert_eq!(tuple.len(), 13);
        assert_eq!(tuple[4], 42.0);
        assert_eq!(tuple[5], 2.0);
        assert_eq!(tuple[12], 270.0);
        assert_eq!(OrganismRecord::from_tuple(&tuple), Some(rec));
    }

    #[test]
    fn test_wrong_length_tuple_is_rejected() {
        assert!(OrganismRecord::from_tuple(&[1.0, 2.0, 3.0]).is_none());
        assert!(OrganismRecord::from_tuple(&[0.0; ORGANISM_FIELDS + 1]).is_none());
    }
}
