//! The shared shelf and its locking discipline.
//!
//! A `Shelf` is a fixed-length array of independently locked slots shared by
//! every worker and the monitor. Multi-lock operations follow one rule:
//! locks are acquired in ascending index order. Workers take their two
//! slots low index first; whole-shelf operations walk from index 0 upward.
//! Any two threads contending for the same locks therefore request them in
//! the same global order, which rules out cyclic waits.

#![allow(dead_code)]

mod slot;

use crate::sync::order::OrderGuard;
use rand::Rng;
use slot::Slot;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::MutexGuard;

/// Exclusive access to one slot's value, tagged with its acquisition-order
/// record. Dereferences to the value.
pub struct SlotGuard<'a> {
    value: MutexGuard<'a, u64>,
    _order: OrderGuard,
}

impl Deref for SlotGuard<'_> {
    type Target = u64;

    fn deref(&self) -> &u64 {
        &self.value
    }
}

impl DerefMut for SlotGuard<'_> {
    fn deref_mut(&mut self) -> &mut u64 {
        &mut self.value
    }
}

/// The shared array of lockable slots.
#[derive(Debug)]
pub struct Shelf {
    slots: Box<[Slot]>,
}

impl Shelf {
    /// Build a shelf holding exactly `values`.
    pub fn with_values(values: Vec<u64>) -> Self {
        assert!(values.len() >= 2, "shelf needs at least two slots");
        Self {
            slots: values.into_iter().map(Slot::new).collect(),
        }
    }

    /// Build a shelf of `size` slots filled with draws from `[0, size)`.
    pub fn with_random_values<R: Rng>(size: usize, rng: &mut R) -> Self {
        assert!(size >= 2, "shelf needs at least two slots");
        let upper = size as u64;
        Self {
            slots: (0..size)
                .map(|_| Slot::new(rng.random_range(0..upper)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Lock slot `index`, recording the acquisition for the ordering check.
    fn slot(&self, index: usize) -> SlotGuard<'_> {
        SlotGuard {
            // The order record is taken before blocking on the mutex so a
            // violating acquisition fails fast instead of deadlocking.
            _order: OrderGuard::acquire(index),
            value: self.slots[index].lock(),
        }
    }

    /// Read the value at `index` under its lock.
    pub fn read(&self, index: usize) -> u64 {
        *self.slot(index)
    }

    /// Overwrite the value at `index` under its lock.
    pub fn write(&self, index: usize, value: u64) {
        *self.slot(index) = value;
    }

    /// Lock the pair `(lo, hi)` in ascending order and swap the two values
    /// if they are out of order. Returns true if a swap happened.
    pub fn compare_and_swap(&self, lo: usize, hi: usize) -> bool {
        assert!(
            lo < hi,
            "slot pair must be ordered low to high, got ({}, {})",
            lo,
            hi
        );
        let mut lower = self.slot(lo);
        let mut upper = self.slot(hi);
        if *lower > *upper {
            mem::swap(&mut *lower, &mut *upper);
            true
        } else {
            false
        }
        // upper drops before lower, releasing hi then lo.
    }

    /// Lock every slot in ascending order and copy out a coherent view.
    pub fn snapshot(&self) -> Vec<u64> {
        let guards: Vec<SlotGuard<'_>> =
            (0..self.slots.len()).map(|i| self.slot(i)).collect();
        guards.iter().map(|guard| **guard).collect()
        // guards drop front to back, releasing in ascending order.
    }

    /// Lock every slot in ascending order, overwrite each with a fresh draw
    /// from `[0, size)`, and return the new contents.
    pub fn reshuffle<R: Rng>(&self, rng: &mut R) -> Vec<u64> {
        let upper = self.slots.len() as u64;
        let mut guards: Vec<SlotGuard<'_>> =
            (0..self.slots.len()).map(|i| self.slot(i)).collect();
        for guard in guards.iter_mut() {
            **guard = rng.random_range(0..upper);
        }
        guards.iter().map(|guard| **guard).collect()
    }
}

/// Render shelf contents as the space-separated line the program prints.
pub fn format_values(values: &[u64]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
