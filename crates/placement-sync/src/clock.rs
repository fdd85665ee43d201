//! Time source for the coordinator.
//!
//! The coordinator needs "today" to bound expiry input and "now" to stamp
//! optimistic status changes. Both come from a [`Clock`] so tests can pin them.

use parking_lot::Mutex;

use placement_core::{CalendarDate, Timestamp};

/// Source of the current instant and calendar date.
pub trait Clock: Send + Sync {
    /// The current UTC instant.
    fn now(&self) -> Timestamp;

    /// Today's calendar date (UTC).
    fn today(&self) -> CalendarDate {
        self.now().date()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A manually controlled clock.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<Timestamp>,
}

impl FixedClock {
    /// A clock stopped at `now`.
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// A clock stopped at midnight UTC on `date`.
    pub fn on(date: CalendarDate) -> Self {
        Self::at(date.start_of_day())
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: Timestamp) {
        *self.now.lock() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
