//! Wall-clock abstraction so window resolution is testable.

use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Source of "now" for bucket resolution.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and event replay.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.lock() = at;
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};
    use chrono::{DateTime, Duration, Utc};

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().expect("parse test instant")
    }

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new(instant("2026-08-28T12:00:00Z"));
        assert_eq!(clock.now(), instant("2026-08-28T12:00:00Z"));

        clock.advance(Duration::hours(13));
        assert_eq!(clock.now(), instant("2026-08-29T01:00:00Z"));

        clock.set(instant("2026-01-01T00:00:00Z"));
        assert_eq!(clock.now(), instant("2026-01-01T00:00:00Z"));
    }
}
