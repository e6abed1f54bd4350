//! What the vault reads from its execution environment: who is calling, and when

use std::cell::Cell;

use crate::account::types::{Identity, Timestamp};

/// Authenticated caller and current time for one invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Identity,
    pub now: Timestamp,
}

impl CallContext {
    pub fn new(caller: Identity, now: Timestamp) -> Self {
        Self { caller, now }
    }
}

pub trait Clock {
    fn now(&self) -> Timestamp;

    fn context(&self, caller: Identity) -> CallContext {
        CallContext::new(caller, self.now())
    }
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn at(now: Timestamp) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn advance(&self, secs: u64) {
        self.now.set(self.now.get().saturating_add(secs));
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::at(100);
        assert_eq!(clock.now(), 100);
        clock.advance(50);
        assert_eq!(clock.context(Identity::from_label("a")).now, 150);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_system_clock_is_recent() {
        // 2020-01-01
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
