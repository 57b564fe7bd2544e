//! A single lockable cell of the shelf.

use std::sync::{Mutex, MutexGuard};

/// One integer cell guarded by its own mutex.
///
/// The value may only be read or written through the guard returned by
/// [`Slot::lock`]; there is no unsynchronized access path.
#[derive(Debug)]
pub struct Slot {
    value: Mutex<u64>,
}

impl Slot {
    pub fn new(value: u64) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    /// Lock the cell. A poisoned mutex means another thread died while
    /// mutating shared state, which is unrecoverable here.
    pub fn lock(&self) -> MutexGuard<'_, u64> {
        self.value.lock().expect("slot mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_its_initial_value() {
        let slot = Slot::new(42);
        assert_eq!(*slot.lock(), 42);
    }

    #[test]
    fn writes_through_the_guard_are_visible() {
        let slot = Slot::new(0);
        *slot.lock() = 9;
        assert_eq!(*slot.lock(), 9);
    }
}
