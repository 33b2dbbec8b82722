use std::collections::VecDeque;

/// Number of one-second samples kept for the live graph.
pub const SAMPLE_CAPACITY: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Bounded rolling buffer of WPM samples, oldest evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct WpmSamples {
    points: VecDeque<TimeSeriesPoint>,
    capacity: usize,
}

impl Default for WpmSamples {
    fn default() -> Self {
        Self::with_capacity(SAMPLE_CAPACITY)
    }
}

impl WpmSamples {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: TimeSeriesPoint) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&TimeSeriesPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSeriesPoint> {
        self.points.iter()
    }

    /// Points as `(seconds, wpm)` tuples for chart datasets.
    pub fn as_tuples(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (*p).into()).collect()
    }
}
