//! Spawning and joining the worker pool.

use super::{Worker, WorkerReport};
use crate::shelf::Shelf;
use crate::sync::ShutdownFlag;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Handles for a pool of running workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerReport>>,
}

impl WorkerPool {
    /// Spawn `count` workers on named threads. Worker `i` seeds its RNG with
    /// `base_seed + 1 + i`, so a fixed base seed reproduces every stream.
    pub fn spawn(
        shelf: &Arc<Shelf>,
        shutdown: &ShutdownFlag,
        base_seed: u64,
        count: usize,
    ) -> Result<Self, String> {
        let mut handles = Vec::with_capacity(count);
        for id in 0..count {
            let seed = base_seed.wrapping_add(1 + id as u64);
            let worker = Worker::new(
                id,
                Arc::clone(shelf),
                shutdown.clone(),
                ChaCha8Rng::seed_from_u64(seed),
            );
            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker.run())
                .map_err(|e| format!("failed to spawn worker {}: {}", id, e))?;
            handles.push(handle);
        }
        Ok(Self { handles })
    }

    /// Wait for every worker to stop. A panicked worker is a fatal error.
    pub fn join(self) -> Result<Vec<WorkerReport>, String> {
        let mut reports = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            let report = handle
                .join()
                .map_err(|_| format!("thread {} panicked", name))?;
            reports.push(report);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sorted_copy(values: &[u64]) -> Vec<u64> {
        let mut copy = values.to_vec();
        copy.sort_unstable();
        copy
    }

    #[test]
    fn pool_spawns_runs_and_reports_in_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let shelf = Arc::new(Shelf::with_random_values(16, &mut rng));
        let before = sorted_copy(&shelf.snapshot());
        let shutdown = ShutdownFlag::new();
        let pool = WorkerPool::spawn(&shelf, &shutdown, 7, 3).unwrap();
        thread::sleep(Duration::from_millis(50));
        shutdown.set();
        let reports = pool.join().unwrap();
        assert_eq!(
            reports.iter().map(|r| r.worker).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(reports.iter().all(|r| r.iterations > 0));
        assert_eq!(sorted_copy(&shelf.snapshot()), before);
    }

    #[test]
    fn a_preset_flag_makes_join_immediate() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let shelf = Arc::new(Shelf::with_random_values(4, &mut rng));
        let shutdown = ShutdownFlag::new();
        shutdown.set();
        let pool = WorkerPool::spawn(&shelf, &shutdown, 13, 2).unwrap();
        let reports = pool.join().unwrap();
        assert_eq!(reports.len(), 2);
    }
}
