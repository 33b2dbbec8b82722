use std::{
    error::Error,
    fs,
    io::{self, stdin, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use clap::{error::ErrorKind, ArgGroup, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};
use unicode_width::UnicodeWidthStr;

use paceline::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    feedback::{Feedback, Silent, TerminalBell},
    history::{self, HistoryStore, MemoryHistory, SqliteHistory},
    logging,
    passage::{self, Passage},
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    ui::{history_view::age_label, screen::current_screen},
};

const TICK_RATE_MS: u64 = 1000;

/// typing speed practice on your own text, with live wpm and a local history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a passage of your choice against the clock. Live speed, accuracy and progress while you type, a results summary at the end, and a local history of recent sessions.",
    group(ArgGroup::new("source").args(["text", "preset", "file", "random_preset"]))
)]
pub struct Cli {
    /// passage to type
    #[clap(short = 't', long)]
    text: Option<String>,

    /// bundled passage to type (see --list-presets)
    #[clap(short = 'p', long)]
    preset: Option<String>,

    /// read the passage from a UTF-8 text file
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// pick a bundled passage at random
    #[clap(long)]
    random_preset: bool,

    /// list bundled passages and exit
    #[clap(long)]
    list_presets: bool,

    /// seconds of countdown before a session starts (0 disables)
    #[clap(short = 'c', long)]
    countdown: Option<u64>,

    /// settings file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// write default settings to the config file and exit
    #[clap(long)]
    write_config: bool,

    /// print the most recent sessions and exit
    #[clap(long, num_args = 0..=1, default_missing_value = "20", value_name = "N")]
    history: Option<usize>,

    /// write stored history to PATH ("-" for stdout) and exit
    #[clap(long, value_name = "PATH")]
    export_history: Option<PathBuf>,

    /// format for --export-history
    #[clap(long, value_enum, default_value_t = ExportFormat::Json)]
    export_format: ExportFormat,

    /// merge sessions from a JSON export into history and exit
    #[clap(long, value_name = "PATH")]
    import_history: Option<PathBuf>,

    /// keep history in memory only for this run
    #[clap(long)]
    no_history: bool,

    /// more logging (-v info, -vv debug, -vvv trace)
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// log file to append to
    #[clap(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    /// Settings from the config file with command-line overrides applied
    fn settings(&self, store: &impl ConfigStore) -> Config {
        let mut config = store.load();
        if let Some(secs) = self.countdown {
            config.countdown_secs = secs;
        }
        config
    }

    fn initial_passage(&self, config: &Config) -> paceline::Result<Option<Passage>> {
        let mode = config.whitespace;
        if let Some(text) = &self.text {
            return Passage::new(text, mode).map(Some);
        }
        if let Some(name) = &self.preset {
            return passage::preset(name)?.passage(mode).map(Some);
        }
        if let Some(path) = &self.file {
            return passage::load_file(path, config.file_size_limit_bytes(), mode).map(Some);
        }
        if self.random_preset {
            return passage::random_preset()?.passage(mode).map(Some);
        }
        Ok(None)
    }
}

fn open_history(no_history: bool, config: &Config) -> Box<dyn HistoryStore> {
    let retention = config.history_retention;
    if no_history {
        return Box::new(MemoryHistory::new(retention));
    }
    let path = AppDirs::history_db_path();
    match SqliteHistory::open(&path, retention) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "history unavailable, keeping it in memory");
            Box::new(MemoryHistory::new(retention))
        }
    }
}

fn output_for(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        Ok(Box::new(io::stdout()))
    } else {
        Ok(Box::new(fs::File::create(path)?))
    }
}

fn export_history(
    store: &dyn HistoryStore,
    path: &Path,
    format: ExportFormat,
) -> paceline::Result<()> {
    let mut out = output_for(path)?;
    match format {
        ExportFormat::Json => {
            let json = history::export_json(store)?;
            writeln!(out, "{json}")?;
        }
        ExportFormat::Csv => history::export_csv(store, &mut out)?,
    }
    out.flush()?;
    info!(path = %path.display(), format = %format, "history exported");
    Ok(())
}

fn print_history(store: &dyn HistoryStore, limit: usize) -> paceline::Result<()> {
    let entries = store.recent(limit)?;
    if entries.is_empty() {
        println!("no sessions recorded yet");
        return Ok(());
    }
    let ages: Vec<String> = entries.iter().map(age_label).collect();
    let width = ages.iter().map(|a| a.width()).max().unwrap_or(0);
    for (entry, age) in entries.iter().zip(&ages) {
        let pad = " ".repeat(width - age.width());
        println!(
            "{age}{pad}  {:>4} wpm  {:>3}% acc  {:>4} words  {:>5}s",
            entry.wpm, entry.accuracy, entry.word_count, entry.elapsed_secs
        );
    }
    Ok(())
}

fn list_presets() -> paceline::Result<()> {
    let presets = passage::presets()?;
    let width = presets.iter().map(|p| p.name.width()).max().unwrap_or(0);
    for preset in presets {
        let words = preset.text.split_whitespace().count();
        let pad = " ".repeat(width - preset.name.width());
        println!("{}{pad}  {} ({words} words)", preset.name, preset.title);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    if let Err(e) = logging::init_logging(cli.verbose, &log_path) {
        eprintln!("warning: {e}");
    }

    let store = cli.config_store();
    if cli.write_config {
        store.save(&Config::default())?;
        println!("wrote {}", store.path().display());
        return Ok(());
    }
    let config = cli.settings(&store);

    if cli.list_presets {
        list_presets()?;
        return Ok(());
    }

    let mut history = open_history(cli.no_history, &config);

    if let Some(path) = &cli.import_history {
        let json = fs::read_to_string(path)?;
        let count = history::import_json(history.as_mut(), &json)?;
        println!("imported {count} sessions");
        return Ok(());
    }
    if let Some(path) = &cli.export_history {
        export_history(history.as_ref(), path, cli.export_format)?;
        return Ok(());
    }
    if let Some(limit) = cli.history {
        print_history(history.as_ref(), limit)?;
        return Ok(());
    }

    let passage = cli.initial_passage(&config)?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let feedback: Box<dyn Feedback> = if config.bell {
        Box::new(TerminalBell::stdout())
    } else {
        Box::new(Silent)
    };
    let mut app = App::new(config, history, feedback);
    if let Some(passage) = passage {
        app.commit(passage, Instant::now());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("tui started");
    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| current_screen(&app.state).render(app, f))?;

        let event = runner.step();
        app.handle_event(event, Instant::now());
        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["paceline"]);

        assert_eq!(cli.text, None);
        assert_eq!(cli.preset, None);
        assert_eq!(cli.history, None);
        assert_eq!(cli.export_format, ExportFormat::Json);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.no_history);
    }

    #[test]
    fn test_cli_history_limit_is_optional() {
        let cli = Cli::parse_from(["paceline", "--history"]);
        assert_eq!(cli.history, Some(20));

        let cli = Cli::parse_from(["paceline", "--history", "5"]);
        assert_eq!(cli.history, Some(5));
    }

    #[test]
    fn test_cli_verbosity_counts() {
        let cli = Cli::parse_from(["paceline", "-vvv"]);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_cli_passage_sources_conflict() {
        let res = Cli::try_parse_from(["paceline", "--text", "hi", "--preset", "rust"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_export_format() {
        let cli = Cli::parse_from(["paceline", "--export-history", "-", "--export-format", "csv"]);
        assert_eq!(cli.export_format, ExportFormat::Csv);
        assert_eq!(cli.export_history, Some(PathBuf::from("-")));
        assert_eq!(ExportFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_countdown_override() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));

        let cli = Cli::parse_from(["paceline", "--countdown", "0"]);
        assert_eq!(cli.settings(&store).countdown_secs, 0);

        let cli = Cli::parse_from(["paceline"]);
        assert_eq!(cli.settings(&store).countdown_secs, 3);
    }

    #[test]
    fn test_initial_passage_sources() {
        let config = Config::default();

        let cli = Cli::parse_from(["paceline", "--text", "  hello   there "]);
        let passage = cli.initial_passage(&config).unwrap().unwrap();
        assert_eq!(passage.as_str(), "hello there");

        let cli = Cli::parse_from(["paceline", "--preset", "no-such-preset"]);
        assert!(matches!(
            cli.initial_passage(&config),
            Err(paceline::Error::UnknownPreset(_))
        ));

        let cli = Cli::parse_from(["paceline"]);
        assert!(cli.initial_passage(&config).unwrap().is_none());

        let cli = Cli::parse_from(["paceline", "--random-preset"]);
        assert!(cli.initial_passage(&config).unwrap().is_some());
    }

    #[test]
    fn test_print_history_handles_empty_store() {
        let store = MemoryHistory::new(20);
        print_history(&store, 5).unwrap();
    }
}
