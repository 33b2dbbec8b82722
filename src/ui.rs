pub mod charting;
pub mod history_view;
pub mod screen;

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, Gauge, GraphType, Paragraph, Widget, Wrap,
    },
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState, Overlay};
use crate::theme::Theme;
use crate::tracker::{Judgment, Session};
use crate::ui::history_view::HistoryTable;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Setup => {
                render_setup(self, area, buf);
                if let Some(overlay) = &self.overlay {
                    render_overlay(overlay, &self.theme, area, buf);
                }
            }
            AppState::Countdown => render_countdown(self, area, buf),
            AppState::Typing => match self.tracker.session() {
                Some(session) => render_typing(self, session, area, buf),
                None => render_setup(self, area, buf),
            },
            AppState::History => HistoryTable::new(self).render(area, buf),
        }
    }
}

/// Lines needed to show `text` at `width` columns, at least one.
fn occupied_lines(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    text.split('\n')
        .map(|line| line.width().div_ceil(width).max(1))
        .sum::<usize>()
        .min(u16::MAX as usize) as u16
}

fn render_setup(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "paceline",
        theme.accent().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let title = match app.setup.preset_idx.and_then(|i| app.presets().get(i)) {
        Some(preset) => format!("Passage: {}", preset.title),
        None => "Passage".to_string(),
    };
    let mut text = app.setup.text.clone();
    text.push('▏');
    Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .render(chunks[1], buf);

    let status = match &app.setup.error {
        Some(e) => Span::styled(e.clone(), theme.warning()),
        None => Span::styled(
            format!(
                "{} chars   countdown {}s",
                app.setup.text.chars().count(),
                app.config.countdown_secs
            ),
            theme.muted(),
        ),
    };
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(enter) start / (ctrl+n/p) presets / (ctrl+u) clear / (f2) history / (esc) quit",
        theme.muted(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}

fn render_countdown(app: &App, area: Rect, buf: &mut Buffer) {
    let remaining = app
        .countdown
        .map_or(0, |c| c.remaining_secs(Instant::now()));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        remaining.to_string(),
        app.theme.accent().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled("get ready... (esc) cancel", app.theme.muted()))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}

/// Styled passage text, one span per character, split on newlines.
pub fn passage_lines(session: &Session, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans = Vec::new();

    for (idx, (expected, judgment)) in session
        .passage()
        .chars()
        .iter()
        .zip(session.judgments())
        .enumerate()
    {
        let style = if session.cursor() == Some(idx) {
            theme.caret()
        } else {
            match judgment {
                Judgment::Pending => theme.pending(),
                Judgment::Correct => theme.correct(),
                Judgment::Incorrect => theme.incorrect(),
            }
        };

        let shown = match (expected, judgment) {
            ('\n', _) => "⏎".to_string(),
            ('\t', _) => "→".to_string(),
            (' ', Judgment::Incorrect) => "·".to_string(),
            (c, _) => c.to_string(),
        };
        spans.push(Span::styled(shown, style));

        if *expected == '\n' {
            lines.push(Line::from(std::mem::take(&mut spans)));
        }
    }
    if !spans.is_empty() || lines.is_empty() {
        lines.push(Line::from(spans));
    }
    lines
}

pub fn stats_line(session: &Session) -> String {
    let m = session.metrics();
    format!(
        "{}s   {} wpm   {} cpm   {}% acc   {}/{} chars   {} errors",
        m.elapsed_secs(),
        m.wpm,
        m.cpm,
        m.accuracy,
        m.correct,
        m.typed,
        m.errors
    )
}

fn render_typing(app: &App, session: &Session, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2);
    let prompt_lines = occupied_lines(session.passage().as_str(), max_chars_per_line);
    let single_line = prompt_lines == 1 && !session.passage().as_str().contains('\n');

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // stats
            Constraint::Length(1), // progress
            Constraint::Length(1),
            Constraint::Length(prompt_lines),
            Constraint::Length(1),
            Constraint::Min(0), // chart
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        stats_line(session),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let progress = session.metrics().progress;
    Gauge::default()
        .gauge_style(theme.accent())
        .ratio(progress.clamp(0.0, 1.0))
        .label(format!("{:.0}%", progress * 100.0))
        .render(chunks[1], buf);

    Paragraph::new(passage_lines(session, theme))
        .alignment(if single_line {
            // when the prompt is small enough to fit on one line
            // centering the text gives a nice zen feeling
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false })
        .render(chunks[3], buf);

    let tuples = session.samples().as_tuples();
    if tuples.len() >= 2 {
        render_chart(&tuples, theme, chunks[5], buf);
    }

    let legend = if app.focused {
        Span::styled("(esc) reset / (ctrl+w) delete word", theme.muted())
    } else {
        Span::styled("press (enter) to focus", theme.warning())
    };
    Paragraph::new(legend)
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
}

fn render_chart(tuples: &[(f64, f64)], theme: &Theme, area: Rect, buf: &mut Buffer) {
    let (overall_duration, highest_wpm) = charting::compute_chart_params(tuples);
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(theme.accent())
        .graph_type(GraphType::Line)
        .data(tuples)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        )
        .render(area, buf);
}

/// Centered popup of at most `width` x `height` cells.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

fn render_overlay(overlay: &Overlay, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let (title, lines, style) = match overlay {
        Overlay::Results(entry) => (
            "Results",
            vec![
                Line::from(Span::styled(
                    format!("{} wpm   {}% acc", entry.wpm, entry.accuracy),
                    theme.correct(),
                )),
                Line::from(format!(
                    "{} words   {} chars   {}s",
                    entry.word_count, entry.characters, entry.elapsed_secs
                )),
            ],
            theme.accent(),
        ),
        Overlay::Warning(message) => (
            "Session discarded",
            vec![Line::from(Span::styled(message.clone(), theme.warning()))],
            theme.warning(),
        ),
    };

    let mut lines = lines;
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("press any key", theme.muted())));

    let popup = popup_area(area, 52, lines.len() as u16 + 2);
    Clear.render(popup, buf);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(title),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(popup, buf);
}
