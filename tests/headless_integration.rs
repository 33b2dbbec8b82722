use std::sync::mpsc;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use paceline::app::{App, AppState, Overlay};
use paceline::config::Config;
use paceline::feedback::Silent;
use paceline::history::{HistoryStore, MemoryHistory};
use paceline::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn enter() -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
}

fn app(countdown_secs: u64) -> App {
    App::new(
        Config {
            countdown_secs,
            ..Config::default()
        },
        Box::new(MemoryHistory::new(20)),
        Box::new(Silent),
    )
}

// Headless integration using the internal runtime + App without a TTY.
// Verifies that a minimal typing flow completes via Runner/TestEventSource.
#[test]
fn headless_typing_flow_completes() {
    let mut app = app(0);
    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    // enter the passage on the setup screen, start, then type it
    for ev in [key('h'), key('i'), enter(), key('h'), key('i')] {
        tx.send(ev).unwrap();
    }

    for _ in 0..100u32 {
        let ev = runner.step();
        app.handle_event(ev, Instant::now());
        if app.overlay.is_some() {
            break;
        }
    }

    assert_eq!(app.state, AppState::Setup);
    assert_matches!(app.overlay, Some(Overlay::Results(ref entry)) if entry.accuracy == 100);
    let stored = app.history.all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].characters, 2);
}

#[test]
fn countdown_runs_on_ticks_before_typing() {
    let mut app = app(1);
    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(20)),
    );

    for ev in [key('o'), key('k'), enter()] {
        tx.send(ev).unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    while app.state != AppState::Typing && Instant::now() < deadline {
        let ev = runner.step();
        app.handle_event(ev, Instant::now());
    }
    assert_eq!(app.state, AppState::Typing);

    for ev in [key('o'), key('k')] {
        app.handle_event(ev, Instant::now());
    }
    assert_matches!(app.overlay, Some(Overlay::Results(_)));
}

#[test]
fn ticks_feed_live_metrics_while_typing() {
    let mut app = app(0);
    let t0 = Instant::now();
    for ev in "the quick fox".chars().map(key).chain([enter()]) {
        app.handle_event(ev, t0);
    }
    for ev in "the qu".chars().map(key) {
        app.handle_event(ev, t0);
    }

    for s in 1..=5 {
        app.handle_event(AppEvent::Tick, t0 + Duration::from_secs(s));
    }

    let session = app.tracker.session().expect("session still running");
    assert_eq!(session.samples().len(), 5);
    // 6 correct chars over 5 s
    assert_eq!(session.metrics().wpm, 14);
    assert_eq!(session.metrics().cpm, 72);
}
