use std::time::Duration;

/// Standard word length used for WPM.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Metrics derived from one judgment pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricsSnapshot {
    pub elapsed: Duration,
    pub wpm: u32,
    pub cpm: u32,
    pub accuracy: u32,
    pub progress: f64,
    pub correct: usize,
    pub errors: usize,
    pub typed: usize,
    pub passage_len: usize,
}

impl MetricsSnapshot {
    /// Snapshot for a session nobody has typed into yet.
    pub fn idle(passage_len: usize) -> Self {
        Self {
            accuracy: 100,
            passage_len,
            ..Self::default()
        }
    }

    pub fn compute(
        correct: usize,
        errors: usize,
        typed: usize,
        passage_len: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            elapsed,
            wpm: wpm(correct, elapsed),
            cpm: cpm(correct, elapsed),
            accuracy: accuracy(correct, typed),
            progress: progress(typed, passage_len),
            correct,
            errors,
            typed,
            passage_len,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }
}

fn minutes(elapsed: Duration) -> f64 {
    elapsed.as_millis() as f64 / 60_000.0
}

pub fn wpm(correct: usize, elapsed: Duration) -> u32 {
    let m = minutes(elapsed);
    if m > 0.0 {
        ((correct as f64 / CHARS_PER_WORD) / m).round() as u32
    } else {
        0
    }
}

pub fn cpm(correct: usize, elapsed: Duration) -> u32 {
    let m = minutes(elapsed);
    if m > 0.0 {
        (correct as f64 / m).round() as u32
    } else {
        0
    }
}

pub fn accuracy(correct: usize, typed: usize) -> u32 {
    if typed > 0 {
        (100.0 * correct as f64 / typed as f64).round() as u32
    } else {
        100
    }
}

pub fn progress(typed: usize, passage_len: usize) -> f64 {
    if passage_len == 0 {
        return 0.0;
    }
    (typed as f64 / passage_len as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wpm_one_minute() {
        assert_eq!(wpm(50, Duration::from_secs(60)), 10);
    }

    #[test]
    fn test_cpm_one_minute() {
        assert_eq!(cpm(50, Duration::from_secs(60)), 50);
    }

    #[test]
    fn test_wpm_zero_elapsed() {
        assert_eq!(wpm(50, Duration::ZERO), 0);
        assert_eq!(cpm(50, Duration::ZERO), 0);
    }

    #[test]
    fn test_wpm_rounds() {
        // 12 correct in 30s -> 2.4 words / 0.5 min = 4.8
        assert_eq!(wpm(12, Duration::from_secs(30)), 5);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(0, 0), 100);
        assert_eq!(accuracy(3, 3), 100);
        assert_eq!(accuracy(0, 4), 0);
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress(0, 10), 0.0);
        assert_eq!(progress(5, 10), 0.5);
        assert_eq!(progress(10, 10), 1.0);
        assert_eq!(progress(3, 0), 0.0);
    }

    #[test]
    fn test_idle_snapshot() {
        let s = MetricsSnapshot::idle(12);
        assert_eq!(s.wpm, 0);
        assert_eq!(s.cpm, 0);
        assert_eq!(s.accuracy, 100);
        assert_eq!(s.progress, 0.0);
        assert_eq!(s.passage_len, 12);
    }

    #[test]
    fn test_compute_snapshot() {
        let s = MetricsSnapshot::compute(50, 2, 52, 100, Duration::from_secs(60));
        assert_eq!(s.wpm, 10);
        assert_eq!(s.cpm, 50);
        assert_eq!(s.accuracy, 96);
        assert_eq!(s.progress, 0.52);
        assert_eq!(s.elapsed_secs(), 60);
    }
}
