use std::time::Duration;

use crate::metrics::MetricsSnapshot;

/// Anti-abuse heuristic: a session typing faster than `max_wpm` once
/// `min_elapsed` has passed is treated as pasted or scripted input.
///
/// This only discourages pasting; it is not a security boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheatPolicy {
    pub min_elapsed: Duration,
    pub max_wpm: u32,
}

impl Default for CheatPolicy {
    fn default() -> Self {
        Self {
            min_elapsed: Duration::from_secs(5),
            max_wpm: 300,
        }
    }
}

/// Details surfaced to the user when a session is flagged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheatReport {
    pub wpm: u32,
    pub elapsed: Duration,
    pub max_wpm: u32,
}

impl CheatReport {
    pub fn message(&self) -> String {
        format!(
            "{} wpm after {}s is above the {} wpm limit; attempt discarded",
            self.wpm,
            self.elapsed.as_secs(),
            self.max_wpm
        )
    }
}

impl CheatPolicy {
    pub fn new(min_elapsed: Duration, max_wpm: u32) -> Self {
        Self {
            min_elapsed,
            max_wpm,
        }
    }

    pub fn check(&self, metrics: &MetricsSnapshot) -> Option<CheatReport> {
        if metrics.elapsed >= self.min_elapsed && metrics.wpm > self.max_wpm {
            Some(CheatReport {
                wpm: metrics.wpm,
                elapsed: metrics.elapsed,
                max_wpm: self.max_wpm,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(wpm: u32, secs: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            wpm,
            elapsed: Duration::from_secs(secs),
            ..MetricsSnapshot::idle(10)
        }
    }

    #[test]
    fn flags_fast_typing_after_grace_period() {
        let policy = CheatPolicy::default();
        let report = policy.check(&snapshot(301, 5)).unwrap();
        assert_eq!(report.wpm, 301);
        assert_eq!(report.max_wpm, 300);
    }

    #[test]
    fn ignores_early_bursts() {
        let policy = CheatPolicy::default();
        assert!(policy.check(&snapshot(900, 4)).is_none());
    }

    #[test]
    fn ceiling_is_exclusive() {
        let policy = CheatPolicy::default();
        assert!(policy.check(&snapshot(300, 30)).is_none());
    }

    #[test]
    fn custom_policy() {
        let policy = CheatPolicy::new(Duration::from_secs(1), 100);
        assert!(policy.check(&snapshot(101, 1)).is_some());
        assert!(policy.check(&snapshot(99, 1)).is_none());
    }

    #[test]
    fn report_message_mentions_limit() {
        let report = CheatReport {
            wpm: 412,
            elapsed: Duration::from_secs(6),
            max_wpm: 300,
        };
        assert!(report.message().contains("300 wpm limit"));
    }
}
