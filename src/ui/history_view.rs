use std::time::Duration;

use chrono::Local;
use itertools::{Itertools, MinMaxResult};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::app::App;
use crate::history::HistoryEntry;

/// "3 minutes ago" style age of an entry
pub fn age_label(entry: &HistoryEntry) -> String {
    let secs = (Local::now() - entry.timestamp).num_seconds().max(0) as u64;
    if secs < 10 {
        return "just now".to_string();
    }
    HumanTime::from(Duration::from_secs(secs)).to_text_en(Accuracy::Rough, Tense::Past)
}

/// Averages and the WPM range over the listed entries
pub fn summary_line(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let n = entries.len() as f64;
    let avg_wpm = entries.iter().map(|e| e.wpm as f64).sum::<f64>() / n;
    let avg_acc = entries.iter().map(|e| e.accuracy as f64).sum::<f64>() / n;
    let range = match entries.iter().map(|e| e.wpm).minmax() {
        MinMaxResult::NoElements => String::new(),
        MinMaxResult::OneElement(w) => format!("{w}"),
        MinMaxResult::MinMax(lo, hi) => format!("{lo}-{hi}"),
    };
    format!(
        "{} sessions   avg {:.0} wpm   avg {:.0}% acc   range {} wpm",
        entries.len(),
        avg_wpm,
        avg_acc,
        range
    )
}

fn present_row(entry: &HistoryEntry) -> Row<'static> {
    Row::new(vec![
        Cell::from(age_label(entry)),
        Cell::from(entry.wpm.to_string()),
        Cell::from(format!("{}%", entry.accuracy)),
        Cell::from(entry.word_count.to_string()),
        Cell::from(format!("{}s", entry.elapsed_secs)),
    ])
}

/// Scrollable table of recent sessions
pub struct HistoryTable<'a> {
    app: &'a App,
}

impl<'a> HistoryTable<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

impl Widget for HistoryTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = &self.app.theme;
        let entries = &self.app.history_view.entries;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(area);

        Paragraph::new(summary_line(entries))
            .block(Block::default().borders(Borders::ALL).title("History"))
            .style(theme.accent().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        if entries.is_empty() {
            Paragraph::new("No sessions recorded yet.")
                .alignment(Alignment::Center)
                .style(theme.muted())
                .render(chunks[1], buf);
        } else {
            let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
            let max_scroll = entries.len().saturating_sub(table_height);
            let offset = self.app.history_view.scroll_offset.min(max_scroll);

            let header = Row::new(vec!["When", "WPM", "Accuracy", "Words", "Time"])
                .style(theme.warning());
            let rows: Vec<Row> = entries
                .iter()
                .skip(offset)
                .take(table_height)
                .map(present_row)
                .collect();
            let widths = [
                Constraint::Min(16),
                Constraint::Length(6),
                Constraint::Length(9),
                Constraint::Length(6),
                Constraint::Length(8),
            ];

            Table::new(rows, widths)
                .header(header)
                .block(Block::default().borders(Borders::ALL))
                .column_spacing(2)
                .render(chunks[1], buf);
        }

        Paragraph::new("(↑/↓) scroll  (PgUp/PgDn) page  (Home) top  (c) clear  (b/esc) back")
            .alignment(Alignment::Center)
            .style(theme.muted())
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(wpm: u32, accuracy: u32, secs_ago: i64) -> HistoryEntry {
        HistoryEntry {
            timestamp: Local::now() - chrono::Duration::seconds(secs_ago),
            wpm,
            accuracy,
            word_count: 10,
            elapsed_secs: 30,
            characters: 50,
        }
    }

    #[test]
    fn summary_of_nothing_is_empty() {
        assert_eq!(summary_line(&[]), "");
    }

    #[test]
    fn summary_reports_averages_and_range() {
        let line = summary_line(&[entry(40, 90, 0), entry(60, 100, 0)]);
        assert_eq!(
            line,
            "2 sessions   avg 50 wpm   avg 95% acc   range 40-60 wpm"
        );
        assert!(summary_line(&[entry(42, 100, 0)]).ends_with("range 42 wpm"));
    }

    #[test]
    fn recent_entries_read_just_now() {
        assert_eq!(age_label(&entry(1, 1, 0)), "just now");
        assert!(age_label(&entry(1, 1, 3 * 3600)).contains("ago"));
    }
}
