//! Fixed-capacity structure-of-arrays storage for organisms and food.
//!
//! A slot index is the entity's identity only while the slot is active. Slots
//! are recycled through a LIFO free stack, so callers must re-check
//! [`SlotAllocator::is_active`] before trusting an index they held on to.

use evolarium_data::{OrganismRecord, Trait, TraitSet, TRAIT_COUNT};

/// Upper bound on simultaneously living organisms.
pub const MAX_ORGANISMS: usize = 10_000;
/// Upper bound on simultaneously existing food pellets.
pub const MAX_FOOD: usize = 20_000;

/// Active flags plus a free stack of reclaimed indices.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    active: Vec<bool>,
    free: Vec<usize>,
    active_count: usize,
}

impl SlotAllocator {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            active: vec![false; capacity],
            // Reversed so the first allocations hand out 0, 1, 2, ...
            free: (0..capacity).rev().collect(),
            active_count: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.active.len()
    }

    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self, idx: usize) -> bool {
        self.active.get(idx).copied().unwrap_or(false)
    }

    #[inline]
    #[must_use]
    pub fn active_flags(&self) -> &[bool] {
        &self.active
    }

    /// Claims a free slot. `None` means the store is full.
    #[inline]
    pub fn alloc(&mut self) -> Option<usize> {
        let idx = self.free.pop()?;
        self.active[idx] = true;
        self.active_count += 1;
        Some(idx)
    }

    /// Returns a slot to the free stack. Releasing an inactive slot does nothing.
    #[inline]
    pub fn release(&mut self, idx: usize) -> bool {
        if !self.is_active(idx) {
            return false;
        }
        self.active[idx] = false;
        self.active_count -= 1;
        self.free.push(idx);
        true
    }

    /// Deactivates everything and refills the free stack to full capacity.
    pub fn reset(&mut self) {
        self.active.fill(false);
        self.free.clear();
        self.free.extend((0..self.active.len()).rev());
        self.active_count = 0;
    }

    pub fn iter_active(&self) -> impl Iterator<Item = usize> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| a.then_some(i))
    }
}

/// Organism columns. Every column has `capacity` entries; values in inactive
/// slots are stale and must not be read.
#[derive(Debug, Clone)]
pub struct OrganismStore {
    slots: SlotAllocator,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub energy: Vec<f64>,
    /// One column per trait, indexed by [`Trait::index`].
    pub traits: [Vec<f64>; TRAIT_COUNT],
    pub generation: Vec<u32>,
    /// Sub-step counter value at which the slot was last filled.
    pub born_step: Vec<u64>,
}

impl OrganismStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: SlotAllocator::new(capacity),
            x: vec![0.0; capacity],
            y: vec![0.0; capacity],
            vx: vec![0.0; capacity],
            vy: vec![0.0; capacity],
            energy: vec![0.0; capacity],
            traits: std::array::from_fn(|_| vec![0.0; capacity]),
            generation: vec![0; capacity],
            born_step: vec![0; capacity],
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of living organisms.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.active_count()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.slots.free_count()
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self, idx: usize) -> bool {
        self.slots.is_active(idx)
    }

    #[inline]
    #[must_use]
    pub fn active_flags(&self) -> &[bool] {
        self.slots.active_flags()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter_active()
    }

    #[inline]
    #[must_use]
    pub fn trait_value(&self, t: Trait, idx: usize) -> f64 {
        self.traits[t.index()][idx]
    }

    #[inline]
    pub fn set_trait(&mut self, t: Trait, idx: usize, value: f64) {
        self.traits[t.index()][idx] = value;
    }

    #[must_use]
    pub fn traits_of(&self, idx: usize) -> TraitSet {
        TraitSet(std::array::from_fn(|k| self.traits[k][idx]))
    }

    /// Writes `record` into a fresh slot. Returns `None` when full.
    pub fn spawn(&mut self, record: &OrganismRecord, generation: u32, step: u64) -> Option<usize> {
        let idx = self.slots.alloc()?;
        self.x[idx] = record.x;
        self.y[idx] = record.y;
        self.vx[idx] = record.vx;
        self.vy[idx] = record.vy;
        self.energy[idx] = record.energy;
        for (k, column) in self.traits.iter_mut().enumerate() {
            column[idx] = record.traits.0[k];
        }
        self.generation[idx] = generation;
        self.born_step[idx] = step;
        Some(idx)
    }

    /// Frees the slot. Returns `false` if it was not alive.
    #[inline]
    pub fn kill(&mut self, idx: usize) -> bool {
        self.slots.release(idx)
    }

    pub fn reset(&mut self) {
        self.slots.reset();
    }

    /// Value copy of a living organism.
    #[must_use]
    pub fn record(&self, idx: usize) -> Option<OrganismRecord> {
        if !self.is_active(idx) {
            return None;
        }
        Some(OrganismRecord {
            x: self.x[idx],
            y: self.y[idx],
            vx: self.vx[idx],
            vy: self.vy[idx],
            energy: self.energy[idx],
            traits: self.traits_of(idx),
        })
    }
}

/// Food pellet columns.
#[derive(Debug, Clone)]
pub struct FoodStore {
    slots: SlotAllocator,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl FoodStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: SlotAllocator::new(capacity),
            x: vec![0.0; capacity],
            y: vec![0.0; capacity],
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.active_count()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.slots.free_count()
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self, idx: usize) -> bool {
        self.slots.is_active(idx)
    }

    #[inline]
    #[must_use]
    pub fn active_flags(&self) -> &[bool] {
        self.slots.active_flags()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter_active()
    }

    pub fn spawn(&mut self, x: f64, y: f64) -> Option<usize> {
        let idx = self.slots.alloc()?;
        self.x[idx] = x;
        self.y[idx] = y;
        Some(idx)
    }

    #[inline]
    pub fn remove(&mut self, idx: usize) -> bool {
        self.slots.release(idx)
    }

    pub fn reset(&mut self) {
        self.slots.reset();
    }
}
