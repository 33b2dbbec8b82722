use std::time::{Duration, Instant};

/// Pre-session countdown, counted in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    started_at: Instant,
    total: Duration,
}

impl Countdown {
    pub fn new(secs: u64, now: Instant) -> Self {
        Self {
            started_at: now,
            total: Duration::from_secs(secs),
        }
    }

    /// Whole seconds left, rounded up so the display reads 3, 2, 1.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        let left = self
            .total
            .saturating_sub(now.saturating_duration_since(self.started_at));
        let secs = left.as_secs();
        if left.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.remaining_secs(now) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_whole_seconds() {
        let t0 = Instant::now();
        let c = Countdown::new(3, t0);
        assert_eq!(c.remaining_secs(t0), 3);
        assert_eq!(c.remaining_secs(t0 + Duration::from_millis(500)), 3);
        assert_eq!(c.remaining_secs(t0 + Duration::from_secs(1)), 2);
        assert_eq!(c.remaining_secs(t0 + Duration::from_millis(2100)), 1);
        assert!(!c.is_done(t0 + Duration::from_millis(2999)));
        assert!(c.is_done(t0 + Duration::from_secs(3)));
    }

    #[test]
    fn zero_is_done_immediately() {
        let t0 = Instant::now();
        assert!(Countdown::new(0, t0).is_done(t0));
    }

    #[test]
    fn overshoot_stays_done() {
        let t0 = Instant::now();
        let c = Countdown::new(1, t0);
        assert_eq!(c.remaining_secs(t0 + Duration::from_secs(10)), 0);
    }
}
