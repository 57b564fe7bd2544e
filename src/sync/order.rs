//! Debug instrumentation for the ascending lock discipline.
//!
//! Every thread that holds more than one slot lock must have acquired them
//! in strictly increasing index order: workers take their pair low index
//! first, and whole-shelf operations walk from index 0 upward. This module
//! records each thread's current holds and panics in debug builds when an
//! acquisition would break that order. Release builds keep the bookkeeping
//! but compile the check away.

use std::cell::Cell;

thread_local! {
    /// Number of locks held by this thread and the highest index among them.
    static HELD: Cell<(u32, usize)> = Cell::new((0, 0));
}

/// Token recording one slot-lock hold on the current thread.
///
/// Create it with [`OrderGuard::acquire`] immediately before locking the
/// slot mutex and drop it once the mutex guard is released.
#[derive(Debug)]
pub struct OrderGuard(());

impl OrderGuard {
    /// Record the acquisition of the lock for `index`.
    ///
    /// In debug builds, panics if the thread already holds a lock with an
    /// index at or above `index`.
    #[inline]
    pub fn acquire(index: usize) -> Self {
        HELD.with(|held| {
            let (count, highest) = held.get();
            debug_assert!(
                count == 0 || index > highest,
                "slot lock order violation: acquiring index {} while holding index {}",
                index,
                highest
            );
            held.set((count + 1, index));
        });
        OrderGuard(())
    }
}

impl Drop for OrderGuard {
    fn drop(&mut self) {
        HELD.with(|held| {
            let (count, highest) = held.get();
            let count = count.saturating_sub(1);
            // Whole-shelf guards release front to back, so the highest index
            // stays valid until the thread holds nothing at all.
            held.set((count, if count == 0 { 0 } else { highest }));
        });
    }
}
