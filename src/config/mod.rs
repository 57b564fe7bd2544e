//! Run configuration.

use std::time::Duration;

/// Parameters for one sorting run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of slots on the shelf.
    pub shelf_size: usize,
    /// Number of sorting workers.
    pub num_workers: usize,
    /// Base seed for every RNG in the run (None = draw from OS entropy).
    pub base_seed: Option<u64>,
    /// Period of the automatic snapshot dump.
    pub dump_interval: Duration,
    /// Optional wall-clock limit; elapsing triggers graceful shutdown.
    pub run_timeout: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            shelf_size: 16,
            num_workers: 4,
            base_seed: None,
            dump_interval: Duration::from_secs(1),
            run_timeout: None,
        }
    }
}

impl RunConfig {
    pub fn with_shelf_size(mut self, size: usize) -> Self {
        self.shelf_size = size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.num_workers = workers;
        self
    }

    pub fn with_seed_option(mut self, seed: Option<u64>) -> Self {
        self.base_seed = seed;
        self
    }

    pub fn with_dump_interval(mut self, interval: Duration) -> Self {
        self.dump_interval = interval;
        self
    }

    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Check the invariants the sorter relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.shelf_size < 2 {
            return Err(format!(
                "shelf size must be at least 2, got {}",
                self.shelf_size
            ));
        }
        if self.num_workers < 1 {
            return Err("worker count must be at least 1".to_string());
        }
        if self.dump_interval.is_zero() {
            return Err("dump interval must be positive".to_string());
        }
        Ok(())
    }
}
