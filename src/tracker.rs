//! The typing session tracker.
//!
//! A [`Session`] is advanced by [`transition`], a pure function of the
//! previous session, one [`Event`] and the current instant. The judgment pass
//! is a full recompute over the whole passage on every input event rather than
//! a diff against the previous buffer: passages are human-typing scale, and
//! recomputing means no stale mark survives a backspace.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::history::HistoryEntry;
use crate::metrics::{self, MetricsSnapshot};
use crate::passage::Passage;
use crate::policy::{CheatPolicy, CheatReport};
use crate::time_series::{TimeSeriesPoint, WpmSamples};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Judgment {
    Pending,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Passage committed, nothing typed yet.
    Ready,
    Running,
    Finished,
    Cheated,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Finished | Status::Cheated)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The whole typed buffer after a change.
    Input(String),
    /// Periodic one-second refresh.
    Tick,
    Reset,
}

/// Final figures of a finished session, not yet placed in wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub wpm: u32,
    pub accuracy: u32,
    pub word_count: usize,
    pub elapsed_secs: u64,
    pub characters: usize,
}

impl Summary {
    pub fn stamp(self, timestamp: DateTime<Local>) -> HistoryEntry {
        HistoryEntry {
            timestamp,
            wpm: self.wpm,
            accuracy: self.accuracy,
            word_count: self.word_count,
            elapsed_secs: self.elapsed_secs,
            characters: self.characters,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Finished(Summary),
    Cheated(CheatReport),
    Reset,
}

/// State of one typing attempt.
#[derive(Debug, Clone)]
pub struct Session {
    passage: Passage,
    policy: CheatPolicy,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
    typed: Vec<char>,
    judgments: Vec<Judgment>,
    cursor: Option<usize>,
    correct: usize,
    errors: usize,
    status: Status,
    samples: WpmSamples,
    metrics: MetricsSnapshot,
}

/// Result of applying one event.
#[derive(Debug, Clone)]
pub struct Step {
    pub session: Session,
    pub snapshot: MetricsSnapshot,
    pub outcome: Option<Outcome>,
}

impl Session {
    pub fn begin(passage: Passage, policy: CheatPolicy) -> Self {
        let len = passage.len();
        Self {
            policy,
            started_at: None,
            ended_at: None,
            typed: Vec::new(),
            judgments: vec![Judgment::Pending; len],
            cursor: Some(0),
            correct: 0,
            errors: 0,
            status: Status::Ready,
            samples: WpmSamples::default(),
            metrics: MetricsSnapshot::idle(len),
            passage,
        }
    }

    pub fn passage(&self) -> &Passage {
        &self.passage
    }

    pub fn judgments(&self) -> &[Judgment] {
        &self.judgments
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn typed_string(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn metrics(&self) -> &MetricsSnapshot {
        &self.metrics
    }

    pub fn samples(&self) -> &WpmSamples {
        &self.samples
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Time since the first keystroke, frozen once the session ends.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => now.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }

    fn judge(&mut self, buffer: &str) {
        self.typed = buffer.chars().collect();

        let mut correct = 0;
        let mut errors = 0;
        for (idx, expected) in self.passage.chars().iter().enumerate() {
            self.judgments[idx] = match self.typed.get(idx) {
                None => Judgment::Pending,
                Some(c) if c == expected => {
                    correct += 1;
                    Judgment::Correct
                }
                Some(_) => {
                    errors += 1;
                    Judgment::Incorrect
                }
            };
        }
        self.correct = correct;
        self.errors = errors;

        let len = self.typed.len();
        self.cursor = (len < self.passage.len()).then_some(len);
    }

    fn snapshot(&self, elapsed: Duration) -> MetricsSnapshot {
        let typed = self.typed.len().min(self.passage.len());
        MetricsSnapshot::compute(
            self.correct,
            self.errors,
            typed,
            self.passage.len(),
            elapsed,
        )
    }

    fn on_input(mut self, buffer: &str, now: Instant) -> (Self, Option<Outcome>) {
        if !buffer.is_empty() && self.started_at.is_none() {
            self.started_at = Some(now);
            self.status = Status::Running;
            info!(chars = self.passage.len(), "session started");
        }

        self.judge(buffer);
        let elapsed = self.elapsed(now);
        self.metrics = if self.has_started() {
            self.snapshot(elapsed)
        } else {
            MetricsSnapshot::idle(self.passage.len())
        };

        if let Some(report) = self.policy.check(&self.metrics) {
            self.status = Status::Cheated;
            self.ended_at = Some(now);
            warn!(
                wpm = report.wpm,
                elapsed_secs = report.elapsed.as_secs(),
                "implausible typing speed, discarding session"
            );
            return (self, Some(Outcome::Cheated(report)));
        }

        if self.typed.len() >= self.passage.len() {
            let summary = self.finish(now);
            return (self, Some(Outcome::Finished(summary)));
        }

        (self, None)
    }

    fn finish(&mut self, now: Instant) -> Summary {
        self.status = Status::Finished;
        self.ended_at = Some(now);
        self.cursor = self.passage.len().checked_sub(1);

        let summary = Summary {
            wpm: self.metrics.wpm,
            accuracy: self.metrics.accuracy,
            word_count: self.passage.word_count(),
            elapsed_secs: self.elapsed(now).as_secs(),
            characters: self.passage.len(),
        };
        info!(
            wpm = summary.wpm,
            accuracy = summary.accuracy,
            elapsed_secs = summary.elapsed_secs,
            "session finished"
        );
        summary
    }

    fn on_tick(mut self, now: Instant) -> Self {
        if self.status != Status::Running {
            return self;
        }
        let elapsed = self.elapsed(now);
        self.metrics = self.snapshot(elapsed);
        self.samples.push(TimeSeriesPoint::new(
            elapsed.as_secs_f64(),
            metrics::wpm(self.correct, elapsed) as f64,
        ));
        self
    }
}

/// Advances `session` by one event.
///
/// Terminal sessions are returned unchanged. `Reset` always yields a fresh
/// session over the same passage together with [`Outcome::Reset`].
pub fn transition(session: Session, event: Event, now: Instant) -> Step {
    if session.status.is_terminal() {
        let snapshot = session.metrics;
        return Step {
            session,
            snapshot,
            outcome: None,
        };
    }

    let (session, outcome) = match event {
        Event::Input(buffer) => session.on_input(&buffer, now),
        Event::Tick => (session.on_tick(now), None),
        Event::Reset => {
            debug!("session reset");
            let fresh = Session::begin(session.passage, session.policy);
            (fresh, Some(Outcome::Reset))
        }
    };

    Step {
        snapshot: session.metrics,
        session,
        outcome,
    }
}

/// Owner of the live session used by the app.
///
/// Once a session produces an outcome it is discarded, returning the tracker
/// to its pre-session state.
#[derive(Debug, Default)]
pub struct Tracker {
    session: Option<Session>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, passage: Passage, policy: CheatPolicy) {
        self.session = Some(Session::begin(passage, policy));
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn apply(&mut self, event: Event, now: Instant) -> Option<Outcome> {
        let session = self.session.take()?;
        let step = transition(session, event, now);
        if step.outcome.is_none() {
            self.session = Some(step.session);
        }
        step.outcome
    }

    pub fn on_input(&mut self, buffer: &str, now: Instant) -> Option<Outcome> {
        self.apply(Event::Input(buffer.to_string()), now)
    }

    pub fn on_tick(&mut self, now: Instant) -> Option<Outcome> {
        self.apply(Event::Tick, now)
    }

    /// Abandons the live session without producing a summary.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            debug!("session abandoned");
        }
    }
}
