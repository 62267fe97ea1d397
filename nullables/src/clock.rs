//! Nullable clock: deterministic time for testing.

use nmr_types::{Clock, Timestamp};
use std::cell::Cell;

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Interior mutability lets a test
/// move time forward while the ledger holds the clock.
#[derive(Debug, Default)]
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get().saturating_add(secs));
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }
}
