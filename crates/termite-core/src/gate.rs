//! The single lock serializing the audio, MIDI and keyboard threads.
//!
//! Every read-modify-write of session state happens inside one `acquire()`
//! span. Critical sections must stay O(1): no allocation, no I/O, no logging,
//! since the audio thread may be waiting behind them.

use parking_lot::{Mutex, MutexGuard};

/// Held for the lifetime of a critical section; dropping it releases the gate.
pub type GateGuard<'a, T> = MutexGuard<'a, T>;

/// Mutual exclusion over the shared session state.
///
/// Not reentrant: acquiring twice on one thread deadlocks.
#[derive(Debug, Default)]
pub struct Gate<T> {
    state: Mutex<T>,
}

impl<T> Gate<T> {
    pub fn new(state: T) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Blocks until the gate is free.
    #[inline]
    pub fn acquire(&self) -> GateGuard<'_, T> {
        self.state.lock()
    }

    /// Runs `f` with the gate held and releases it before returning.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.state.lock();
        f(&mut guard)
    }

    /// Whether some thread currently holds the gate.
    pub fn is_held(&self) -> bool {
        self.state.is_locked()
    }

    /// Tears the gate down. Only valid once every producer has stopped,
    /// which ownership of `self` proves.
    pub fn into_inner(self) -> T {
        self.state.into_inner()
    }
}
