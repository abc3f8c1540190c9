//! Deterministic host time for vault tests.

use std::cell::Cell;
use vault_types::Timestamp;

const DAY_SECS: u64 = 24 * 3600;

/// The `now` a host would pass into each vault call.
///
/// Time moves only when a test moves it. `rewind` exists so tests can
/// exercise clock-regression handling.
pub struct NullClock {
    current: Cell<Timestamp>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(Timestamp::new(initial_secs)),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.current.get()
    }

    pub fn advance(&self, secs: u64) {
        let next = self.now().as_secs().saturating_add(secs);
        self.current.set(Timestamp::new(next));
    }

    pub fn advance_days(&self, days: u64) {
        self.advance(days.saturating_mul(DAY_SECS));
    }

    /// Jump forward to `target`. Earlier targets are ignored.
    pub fn advance_to(&self, target: Timestamp) {
        if target > self.now() {
            self.current.set(target);
        }
    }

    /// Step backwards by `secs`, saturating at the epoch.
    pub fn rewind(&self, secs: u64) {
        let prev = self.now().as_secs().saturating_sub(secs);
        self.current.set(Timestamp::new(prev));
    }
}
