//! Worker threads performing randomized compare-and-swap passes.

pub mod pool;

pub use pool::WorkerPool;

use crate::shelf::Shelf;
use crate::sync::ShutdownFlag;
use log::debug;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Statistics returned by a worker when it stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub iterations: u64,
    pub swaps: u64,
}

/// A single sorting worker.
///
/// Each iteration checks the shutdown flag while holding no locks, draws two
/// distinct slot indices, and lets the shelf swap the pair if it is out of
/// order. The RNG is private to the worker; seeds are assigned by the pool.
pub struct Worker {
    id: usize,
    shelf: Arc<Shelf>,
    shutdown: ShutdownFlag,
    rng: ChaCha8Rng,
}

impl Worker {
    pub fn new(id: usize, shelf: Arc<Shelf>, shutdown: ShutdownFlag, rng: ChaCha8Rng) -> Self {
        Self {
            id,
            shelf,
            shutdown,
            rng,
        }
    }

    /// Run until the shutdown flag is observed; returns the final counts.
    pub fn run(mut self) -> WorkerReport {
        debug!("worker {} starting", self.id);
        let mut iterations = 0u64;
        let mut swaps = 0u64;
        while !self.shutdown.is_set() {
            let (lo, hi) = self.draw_pair();
            if self.shelf.compare_and_swap(lo, hi) {
                swaps += 1;
            }
            iterations += 1;
        }
        debug!(
            "worker {} stopping after {} iterations ({} swaps)",
            self.id, iterations, swaps
        );
        WorkerReport {
            worker: self.id,
            iterations,
            swaps,
        }
    }

    /// Draw two distinct slot indices and return them in ascending order.
    ///
    /// The second index is resampled until it differs from the first, which
    /// terminates with probability 1 for any shelf of at least two slots.
    fn draw_pair(&mut self) -> (usize, usize) {
        let size = self.shelf.len();
        let first = self.rng.random_range(0..size);
        let mut second = self.rng.random_range(0..size);
        while second == first {
            second = self.rng.random_range(0..size);
        }
        if first < second {
            (first, second)
        } else {
            (second, first)
        }
    }
}
