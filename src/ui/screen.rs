use ratatui::Frame;

use crate::app::{App, AppState};
use crate::ui::history_view::HistoryTable;

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Setup, countdown and typing share the session widget
pub struct SessionScreen;

impl Screen for SessionScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(HistoryTable::new(app), f.area());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Setup | AppState::Countdown | AppState::Typing => Box::new(SessionScreen),
        AppState::History => Box::new(HistoryScreen),
    }
}
