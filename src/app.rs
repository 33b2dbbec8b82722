use std::time::Instant;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::countdown::Countdown;
use crate::feedback::Feedback;
use crate::history::{HistoryEntry, HistoryStore};
use crate::passage::{self, Passage, Preset};
use crate::runtime::AppEvent;
use crate::theme::Theme;
use crate::tracker::{Outcome, Tracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Setup,
    Countdown,
    Typing,
    History,
}

/// Shown on top of the setup screen until any key is pressed.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Results(HistoryEntry),
    Warning(String),
}

#[derive(Debug, Default)]
pub struct SetupState {
    pub text: String,
    pub preset_idx: Option<usize>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct HistoryViewState {
    pub scroll_offset: usize,
    pub entries: Vec<HistoryEntry>,
}

pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub state: AppState,
    pub setup: SetupState,
    pub overlay: Option<Overlay>,
    pub tracker: Tracker,
    /// What the user has typed into the current session.
    pub buffer: String,
    /// With auto-focus off, typing is ignored until Enter is pressed.
    pub focused: bool,
    pub countdown: Option<Countdown>,
    pub history: Box<dyn HistoryStore>,
    pub history_view: HistoryViewState,
    pub should_quit: bool,
    pending: Option<Passage>,
    presets: Vec<Preset>,
    feedback: Box<dyn Feedback>,
}

impl App {
    pub fn new(config: Config, history: Box<dyn HistoryStore>, feedback: Box<dyn Feedback>) -> Self {
        let presets = passage::presets().unwrap_or_else(|e| {
            warn!(error = %e, "could not load bundled presets");
            Vec::new()
        });
        let theme = Theme::new(config.theme, &config.palette, config.caret);

        Self {
            theme,
            state: AppState::Setup,
            setup: SetupState::default(),
            overlay: None,
            tracker: Tracker::new(),
            buffer: String::new(),
            focused: config.auto_focus,
            countdown: None,
            history,
            history_view: HistoryViewState::default(),
            should_quit: false,
            pending: None,
            presets,
            feedback,
            config,
        }
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// Starts from the setup text, reporting an empty passage on the setup screen.
    pub fn start(&mut self, now: Instant) {
        match Passage::new(&self.setup.text, self.config.whitespace) {
            Ok(passage) => {
                self.setup.error = None;
                self.commit(passage, now);
            }
            Err(e) => {
                debug!(error = %e, "refusing to start");
                self.setup.error = Some(e.to_string());
            }
        }
    }

    /// Commits a passage, running the countdown first when configured.
    pub fn commit(&mut self, passage: Passage, now: Instant) {
        self.overlay = None;
        self.setup.text = passage.as_str().to_string();
        if self.config.countdown_secs > 0 {
            self.countdown = Some(Countdown::new(self.config.countdown_secs, now));
            self.pending = Some(passage);
            self.state = AppState::Countdown;
        } else {
            self.begin_session(passage);
        }
    }

    fn begin_session(&mut self, passage: Passage) {
        debug!(chars = passage.len(), words = passage.word_count(), "begin session");
        self.tracker.begin(passage, self.config.cheat_policy());
        self.buffer.clear();
        self.countdown = None;
        self.pending = None;
        self.focused = self.config.auto_focus;
        self.state = AppState::Typing;
    }

    pub fn handle_event(&mut self, event: AppEvent, now: Instant) {
        match event {
            AppEvent::Key(key) => self.handle_key(key, now),
            AppEvent::Paste(text) => self.handle_paste(&text, now),
            AppEvent::Tick => self.on_tick(now),
            AppEvent::Resize => {}
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        match self.state {
            AppState::Countdown => {
                if self.countdown.is_some_and(|c| c.is_done(now)) {
                    if let Some(passage) = self.pending.take() {
                        self.begin_session(passage);
                    }
                }
            }
            AppState::Typing => {
                if let Some(outcome) = self.tracker.on_tick(now) {
                    self.settle(outcome);
                }
            }
            AppState::Setup | AppState::History => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state {
            AppState::Setup => self.setup_key(key, now),
            AppState::Countdown => {
                if key.code == KeyCode::Esc {
                    self.countdown = None;
                    self.pending = None;
                    self.state = AppState::Setup;
                }
            }
            AppState::Typing => self.typing_key(key, now),
            AppState::History => self.history_key(key),
        }
    }

    fn handle_paste(&mut self, text: &str, now: Instant) {
        match self.state {
            AppState::Setup => {
                self.overlay = None;
                self.setup.text.push_str(text);
            }
            AppState::Typing if self.focused => {
                self.push_input(text.chars(), now);
            }
            _ => {}
        }
    }

    fn setup_key(&mut self, key: KeyEvent, now: Instant) {
        if self.overlay.take().is_some() {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.start(now),
            KeyCode::F(2) => self.open_history(),
            KeyCode::Backspace => {
                self.setup.text.pop();
            }
            KeyCode::Char('u') if ctrl => self.setup.text.clear(),
            KeyCode::Char('n') if ctrl => self.cycle_preset(true),
            KeyCode::Char('p') if ctrl => self.cycle_preset(false),
            KeyCode::Char(c) if !ctrl => {
                self.setup.error = None;
                self.setup.text.push(c);
            }
            _ => {}
        }
    }

    fn cycle_preset(&mut self, forward: bool) {
        if self.presets.is_empty() {
            return;
        }
        let len = self.presets.len();
        let idx = match (self.setup.preset_idx, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.setup.preset_idx = Some(idx);
        self.setup.text = self.presets[idx].text.clone();
        self.setup.error = None;
    }

    fn typing_key(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Esc {
            info!("session abandoned");
            self.tracker.reset();
            self.buffer.clear();
            self.state = AppState::Setup;
            return;
        }

        if !self.focused {
            if key.code == KeyCode::Enter {
                self.focused = true;
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Backspace if ctrl => self.delete_word(now),
            KeyCode::Char('w') if ctrl => self.delete_word(now),
            KeyCode::Backspace => {
                if self.buffer.pop().is_some() {
                    self.apply_buffer(0, now);
                }
            }
            KeyCode::Enter => self.push_input(std::iter::once('\n'), now),
            KeyCode::Tab => self.push_input(std::iter::once('\t'), now),
            KeyCode::Char(c) if !ctrl => self.push_input(std::iter::once(c), now),
            _ => {}
        }
    }

    fn delete_word(&mut self, now: Instant) {
        let trimmed = self.buffer.trim_end_matches(char::is_whitespace);
        let cut = trimmed
            .rfind(char::is_whitespace)
            .map(|i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        if cut != self.buffer.len() {
            self.buffer.truncate(cut);
            self.apply_buffer(0, now);
        }
    }

    fn push_input<I: Iterator<Item = char>>(&mut self, chars: I, now: Instant) {
        let Some(limit) = self.tracker.session().map(|s| s.passage().len()) else {
            return;
        };
        let mut count = self.buffer.chars().count();
        let mut added = 0;
        for c in chars {
            if count >= limit {
                break;
            }
            self.buffer.push(c);
            count += 1;
            added += 1;
        }
        if added > 0 {
            self.apply_buffer(added, now);
        }
    }

    /// Re-judges the buffer; `added` trailing characters are new keystrokes.
    fn apply_buffer(&mut self, added: usize, now: Instant) {
        let outcome = self.tracker.on_input(&self.buffer, now);

        if let Some(session) = self.tracker.session() {
            let typed = session.typed().len();
            let judged = session.judgments().iter().take(typed);
            for judgment in judged.skip(typed.saturating_sub(added)) {
                self.feedback.keystroke(*judgment);
            }
        }

        if let Some(outcome) = outcome {
            self.settle(outcome);
        }
    }

    /// Handles a session leaving the tracker and returns to setup.
    fn settle(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Finished(summary) => {
                let entry = summary.stamp(Local::now());
                self.feedback.finished();
                if let Err(e) = self.history.append(&entry) {
                    error!(error = %e, "failed to record history");
                }
                self.overlay = Some(Overlay::Results(entry));
            }
            Outcome::Cheated(report) => {
                self.overlay = Some(Overlay::Warning(report.message()));
            }
            Outcome::Reset => {}
        }
        self.buffer.clear();
        self.state = AppState::Setup;
    }

    pub fn open_history(&mut self) {
        self.history_view.scroll_offset = 0;
        self.history_view.entries = match self.history.all() {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, "failed to read history");
                Vec::new()
            }
        };
        self.state = AppState::History;
    }

    fn history_key(&mut self, key: KeyEvent) {
        let view = &mut self.history_view;
        let last = view.entries.len().saturating_sub(1);
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.state = AppState::Setup,
            KeyCode::Up => view.scroll_offset = view.scroll_offset.saturating_sub(1),
            KeyCode::Down => view.scroll_offset = (view.scroll_offset + 1).min(last),
            KeyCode::PageUp => view.scroll_offset = view.scroll_offset.saturating_sub(10),
            KeyCode::PageDown => view.scroll_offset = (view.scroll_offset + 10).min(last),
            KeyCode::Home => view.scroll_offset = 0,
            KeyCode::Char('c') => {
                if let Err(e) = self.history.clear() {
                    error!(error = %e, "failed to clear history");
                }
                self.open_history();
            }
            _ => {}
        }
    }
}
