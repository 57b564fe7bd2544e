//! Shared synchronization primitives: the process-wide shutdown flag and
//! the lock-ordering instrumentation.

pub mod order;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide shutdown request flag.
///
/// The flag transitions false to true at most once per run. Workers read it
/// once per loop iteration while holding no locks; the monitor sets it when
/// it leaves its event loop. Observation may lag by one worker iteration,
/// which is acceptable.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request shutdown. Idempotent; the flag never returns to false.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn starts_unset() {
        assert!(!ShutdownFlag::new().is_set());
    }

    #[test]
    fn set_is_sticky() {
        let flag = ShutdownFlag::new();
        flag.set();
        flag.set();
        assert!(flag.is_set());
    }

    #[test]
    fn clones_share_one_flag() {
        let flag = ShutdownFlag::new();
        let observer = flag.clone();
        let handle = thread::spawn(move || {
            flag.set();
        });
        handle.join().unwrap();
        assert!(observer.is_set());
    }
}
