//! Rolling daily spend limit

use serde::{Deserialize, Serialize};

use super::types::{Amount, Timestamp};
use crate::error::GuardError;

/// Length of the rolling spend window in seconds.
pub const SPEND_WINDOW_SECS: u64 = 86_400;

/// Daily allowance and the spend accumulated in the current window.
///
/// `spent_today` is only meaningful relative to `last_spend_at`; every reader
/// goes through [`SpendLimit::spent_as_of`] so the lazy window reset is applied
/// the same way everywhere.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SpendLimit {
    daily_allowance: Amount,
    spent_today: Amount,
    last_spend_at: Timestamp,
}

impl SpendLimit {
    pub fn new(daily_allowance: Amount) -> Self {
        Self {
            daily_allowance,
            ..Self::default()
        }
    }

    pub fn daily_allowance(&self) -> Amount {
        self.daily_allowance
    }

    pub fn last_spend_at(&self) -> Timestamp {
        self.last_spend_at
    }

    /// Returns the previous allowance.
    pub fn set_allowance(&mut self, amount: Amount) -> Amount {
        std::mem::replace(&mut self.daily_allowance, amount)
    }

    pub fn window_elapsed(&self, now: Timestamp) -> bool {
        now > self.last_spend_at.saturating_add(SPEND_WINDOW_SECS)
    }

    /// Spend counted against the allowance at `now`.
    pub fn spent_as_of(&self, now: Timestamp) -> Amount {
        if self.window_elapsed(now) {
            0
        } else {
            self.spent_today
        }
    }

    pub fn remaining_as_of(&self, now: Timestamp) -> Amount {
        self.daily_allowance.saturating_sub(self.spent_as_of(now))
    }

    /// Window total after spending `amount` at `now`, if the allowance permits it.
    pub fn check(&self, now: Timestamp, amount: Amount) -> Result<Amount, GuardError> {
        let exceeded = GuardError::LimitExceeded {
            requested: amount,
            remaining: self.remaining_as_of(now),
        };
        let total = self
            .spent_as_of(now)
            .checked_add(amount)
            .ok_or_else(|| exceeded.clone())?;
        if total > self.daily_allowance {
            return Err(exceeded);
        }
        Ok(total)
    }

    /// Commit a spend previously validated by [`SpendLimit::check`].
    pub fn record(&mut self, now: Timestamp, window_total: Amount) {
        self.spent_today = window_total;
        self.last_spend_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: Timestamp = 1_700_000_000;

    #[test]
    fn test_limit_enforced_within_window() {
        let mut limit = SpendLimit::new(1000);
        let total = limit.check(T0, 600).unwrap();
        limit.record(T0, total);
        assert_eq!(limit.spent_as_of(T0), 600);

        assert_eq!(
            limit.check(T0 + 10, 500),
            Err(GuardError::LimitExceeded { requested: 500, remaining: 400 })
        );
        // Exactly the remainder is allowed
        assert_eq!(limit.check(T0 + 10, 400), Ok(1000));
    }

    #[test]
    fn test_window_reset_is_lazy_and_strict() {
        let mut limit = SpendLimit::new(1000);
        limit.record(T0, 1000);

        // Boundary is inclusive of the full day
        assert_eq!(limit.spent_as_of(T0 + SPEND_WINDOW_SECS), 1000);
        assert!(limit.check(T0 + SPEND_WINDOW_SECS, 1).is_err());

        let later = T0 + SPEND_WINDOW_SECS + 1;
        assert_eq!(limit.spent_as_of(later), 0);
        assert_eq!(limit.remaining_as_of(later), 1000);
        // Reading never rewrites stored accounting
        assert_eq!(limit.spent_today, 1000);

        assert_eq!(limit.check(later, 700), Ok(700));
    }

    #[test]
    fn test_overflow_reported_as_limit() {
        let mut limit = SpendLimit::new(Amount::MAX);
        limit.record(T0, Amount::MAX - 1);
        assert!(matches!(
            limit.check(T0, 2),
            Err(GuardError::LimitExceeded { requested: 2, remaining: 1 })
        ));
    }

    #[test]
    fn test_lowering_allowance_below_spend() {
        let mut limit = SpendLimit::new(1000);
        limit.record(T0, 800);
        assert_eq!(limit.set_allowance(500), 1000);
        assert_eq!(limit.remaining_as_of(T0), 0);
        assert!(limit.check(T0, 1).is_err());
    }
}
