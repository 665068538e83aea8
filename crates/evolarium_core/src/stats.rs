//! Trait histograms sampled from the living population.
//!
//! Only counts are produced here; drawing belongs to the host.

use crate::genetics;
use crate::store::OrganismStore;
use evolarium_data::{Trait, TRAIT_COUNT};
use serde::{Deserialize, Serialize};

pub const HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitHistogram {
    /// Display range. Values outside it land in the first or last bin.
    pub min: f64,
    pub max: f64,
    pub counts: [u32; HISTOGRAM_BINS],
    /// Largest bin in the latest sample.
    pub peak: u32,
    /// Largest bin seen since the last reset, for stable normalization.
    pub running_max: u32,
    pub mean: f64,
}

impl TraitHistogram {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            counts: [0; HISTOGRAM_BINS],
            peak: 0,
            running_max: 0,
            mean: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn bin_for(&self, value: f64) -> usize {
        let span = self.max - self.min;
        if !(span > 0.0) {
            return 0;
        }
        let t = (value - self.min) / span;
        // Negative and NaN saturate to 0 in the cast.
        ((t * HISTOGRAM_BINS as f64) as usize).min(HISTOGRAM_BINS - 1)
    }

    fn clear_counts(&mut self) {
        self.counts = [0; HISTOGRAM_BINS];
        self.peak = 0;
        self.mean = 0.0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitHistograms {
    pub traits: [TraitHistogram; TRAIT_COUNT],
    pub samples: u64,
    pub population: usize,
    pub food: usize,
}

impl Default for TraitHistograms {
    fn default() -> Self {
        Self::new()
    }
}

impl TraitHistograms {
    /// Histograms over each trait's declared range.
    #[must_use]
    pub fn new() -> Self {
        Self {
            traits: std::array::from_fn(|k| {
                let s = genetics::TRAIT_SPECS[k];
                TraitHistogram::new(s.min, s.max)
            }),
            samples: 0,
            population: 0,
            food: 0,
        }
    }

    #[must_use]
    pub fn histogram(&self, t: Trait) -> &TraitHistogram {
        &self.traits[t.index()]
    }

    /// Overrides the display range of one trait. Takes effect at the next sample.
    pub fn set_display_range(&mut self, t: Trait, min: f64, max: f64) {
        let h = &mut self.traits[t.index()];
        h.min = min;
        h.max = max;
    }

    /// Rebins every trait from a full scan of the living population.
    pub fn sample(&mut self, organisms: &OrganismStore, food_count: usize) {
        for h in &mut self.traits {
            h.clear_counts();
        }

        let mut sums = [0.0; TRAIT_COUNT];
        for idx in organisms.iter_active() {
            for t in Trait::ALL {
                let v = organisms.trait_value(t, idx);
                let h = &mut self.traits[t.index()];
                let bin = h.bin_for(v);
                h.counts[bin] += 1;
                sums[t.index()] += v;
            }
        }

        let population = organisms.len();
        for (k, h) in self.traits.iter_mut().enumerate() {
            h.peak = h.counts.iter().copied().max().unwrap_or(0);
            h.running_max = h.running_max.max(h.peak);
            if population > 0 {
                h.mean = sums[k] / population as f64;
            }
        }

        self.population = population;
        self.food = food_count;
        self.samples += 1;
    }

    pub fn reset(&mut self) {
        for h in &mut self.traits {
            h.clear_counts();
            h.running_max = 0;
        }
        self.samples = 0;
        self.population = 0;
        self.food = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evolarium_data::{OrganismRecord, TraitSet};

    fn store_with_sizes(sizes: &[f64]) -> OrganismStore {
        let mut store = OrganismStore::new(sizes.len());
        for &s in sizes {
            let mut traits = TraitSet::default();
            traits[Trait::Size] = s;
            traits[Trait::Speed] = 1.0;
            let rec = OrganismRecord {
                energy: 1.0,
                traits,
                ..Default::default()
            };
            store.spawn(&rec, 0, 0);
        }
        store
    }

    #[test]
    fn test_bin_edges_and_clamping() {
        let h = TraitHistogram::new(0.0, 20.0);
        assert_eq!(h.bin_for(0.0), 0);
        assert_eq!(h.bin_for(0.99), 0);
        assert_eq!(h.bin_for(1.0), 1);
        assert_eq!(h.bin_for(19.99), HISTOGRAM_BINS - 1);
        assert_eq!(h.bin_for(20.0), HISTOGRAM_BINS - 1);
        assert_eq!(h.bin_for(-5.0), 0);
        assert_eq!(h.bin_for(500.0), HISTOGRAM_BINS - 1);
        assert_eq!(h.bin_for(f64::NAN), 0);
    }

    #[test]
    fn test_degenerate_range_uses_first_bin() {
        let h = TraitHistogram::new(3.0, 3.0);
        assert_eq!(h.bin_for(10.0), 0);
    }

    #[test]
    fn test_sample_counts_population() {
        let store = store_with_sizes(&[2.0, 2.5, 19.9, 11.0]);
        let mut stats = TraitHistograms::new();
        stats.sample(&store, 7);

        let size = stats.histogram(Trait::Size);
        assert_eq!(size.counts.iter().sum::<u32>(), 4);
        assert_eq!(size.counts[0], 2);
        assert_eq!(size.counts[HISTOGRAM_BINS - 1], 1);
        assert_eq!(size.peak, 2);
        assert!((size.mean - 8.85).abs() < 1e-9);
        assert_eq!(stats.population, 4);
        assert_eq!(stats.food, 7);
    }

    #[test]
    fn test_running_max_survives_smaller_samples() {
        let mut store = store_with_sizes(&[5.0, 5.0, 5.0]);
        let mut stats = TraitHistograms::new();
        stats.sample(&store, 0);
        store.kill(0);
        store.kill(1);
        stats.sample(&store, 0);
        let size = stats.histogram(Trait::Size);
        assert_eq!(size.peak, 1);
        assert_eq!(size.running_max, 3);

        stats.reset();
        assert_eq!(stats.histogram(Trait::Size).running_max, 0);
    }

    #[test]
    fn test_custom_display_range() {
        let store = store_with_sizes(&[5.0, 15.0]);
        let mut stats = TraitHistograms::new();
        stats.set_display_range(Trait::Size, 0.0, 10.0);
        stats.sample(&store, 0);
        let size = stats.histogram(Trait::Size);
        assert_eq!(size.counts[10], 1);
        assert_eq!(size.counts[HISTOGRAM_BINS - 1], 1);
    }
}
