use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::SetCursorStyle,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
    process,
    sync::Mutex,
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use typist::{
    config::{Config, ConfigStore, CursorStyle, FileConfigStore, SessionConfig},
    driver::{Context, Driver, DriverOptions, ExitStatus},
    runtime::{EventChannel, TICK_RATE_MS},
    sources::{
        available, DataKind, FixedSource, QuoteSource, SegmentSource, SentenceSource, WordSource,
    },
    stats::ResultsHistory,
    theme::Theme,
};

/// minimal terminal typing test
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A minimal terminal typing test. Type random words, quotes, generated sentences or your own text and get WPM, accuracy and the words you missed."
)]
pub struct Cli {
    /// custom text to type
    #[clap(short = 'p', long, conflicts_with_all = ["words", "quotes", "full_sentences"])]
    prompt: Option<String>,

    /// word list to draw random words from, by name or path
    #[clap(long, conflicts_with_all = ["quotes", "full_sentences"])]
    words: Option<String>,

    /// quote file to draw quotes from, by name or path
    #[clap(long, conflicts_with = "full_sentences")]
    quotes: Option<String>,

    /// number of generated sentences per segment
    #[clap(short = 'f', long = "full-sentences")]
    full_sentences: Option<usize>,

    /// number of words per segment
    #[clap(short = 'n', long = "num-words")]
    num_words: Option<usize>,

    /// number of segments per test
    #[clap(short = 'g', long = "num-segments")]
    num_segments: Option<usize>,

    /// time limit of each test in seconds
    #[clap(short = 's', long)]
    timeout: Option<u64>,

    /// make space insert a literal space instead of skipping to the next word
    #[clap(long)]
    no_skip: bool,

    /// disable backspace and word deletion
    #[clap(long)]
    no_backspace: bool,

    /// use a block cursor instead of a bar
    #[clap(long)]
    block_cursor: bool,

    /// show live WPM while typing
    #[clap(long)]
    show_wpm: bool,

    /// exit after the first completed test
    #[clap(long)]
    oneshot: bool,

    /// theme to use, by name or path
    #[clap(long, conflicts_with = "no_theme")]
    theme: Option<String>,

    /// use the terminal's own colors
    #[clap(long)]
    no_theme: bool,

    /// draw correctly typed text in bold
    #[clap(long)]
    bold: bool,

    /// maximum width of the text block
    #[clap(long)]
    width: Option<usize>,

    /// print the available word lists, quote files or themes and exit
    #[clap(long, value_enum)]
    list: Option<DataKind>,

    /// print the results as JSON on exit
    #[clap(long)]
    json: bool,

    /// write logs to this file (level from RUST_LOG, default info)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// persist the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Override the stored settings with whatever was given on the command line.
    fn apply(&self, cfg: &mut Config) {
        if let Some(n) = self.num_words {
            cfg.number_of_words = n;
        }
        if let Some(n) = self.num_segments {
            cfg.number_of_segments = n;
        }
        if self.timeout.is_some() {
            cfg.timeout_secs = self.timeout;
        }
        if let Some(width) = self.width {
            cfg.width = width;
        }
        if let Some(words) = &self.words {
            cfg.word_list = words.clone();
        }
        if let Some(theme) = &self.theme {
            cfg.theme = theme.clone();
        }
        if self.no_skip {
            cfg.skip_word = false;
        }
        if self.no_backspace {
            cfg.backspace = false;
        }
        if self.block_cursor {
            cfg.block_cursor = true;
        }
        if self.show_wpm {
            cfg.show_wpm = true;
        }
        if self.bold {
            cfg.bold = true;
        }
    }

    fn source(&self, cfg: &Config) -> typist::Result<Box<dyn SegmentSource>> {
        let source: Box<dyn SegmentSource> = if let Some(prompt) = &self.prompt {
            Box::new(FixedSource::new(prompt)?)
        } else if let Some(quotes) = &self.quotes {
            Box::new(QuoteSource::from_name(quotes)?)
        } else if let Some(sentences) = self.full_sentences {
            Box::new(SentenceSource::new(sentences, cfg.number_of_segments))
        } else {
            Box::new(WordSource::from_name(
                &cfg.word_list,
                cfg.number_of_words,
                cfg.number_of_segments,
            )?)
        };
        Ok(source)
    }

    fn theme(&self, cfg: &Config) -> typist::Result<Theme> {
        if self.no_theme {
            Ok(Theme::plain(cfg.bold))
        } else {
            Theme::load(&cfg.theme, cfg.bold)
        }
    }
}

fn init_logging(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("typist: {e}");
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32, Box<dyn Error>> {
    if let Some(kind) = cli.list {
        for name in available(kind) {
            println!("{name}");
        }
        return Ok(0);
    }

    init_logging(cli.log_file.as_deref())?;

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply(&mut config);
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "saved config");
    }

    // resolve everything that can fail on bad input before touching the terminal
    let source = cli.source(&config)?;
    let theme = cli.theme(&config)?;
    let session_config = SessionConfig::from(&config);
    let options = DriverOptions {
        width: config.width,
        oneshot: cli.oneshot,
        tick: Duration::from_millis(TICK_RATE_MS),
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut history = ResultsHistory::default();
    let status = start_tui(&mut history, source, &theme, &session_config, options)?;

    print_summary(&history, cli.json)?;
    Ok(status.code())
}

fn start_tui(
    history: &mut ResultsHistory,
    source: Box<dyn SegmentSource>,
    theme: &Theme,
    session_config: &SessionConfig,
    options: DriverOptions,
) -> Result<ExitStatus, Box<dyn Error>> {
    let cursor_style = match session_config.cursor {
        CursorStyle::Block => SetCursorStyle::BlinkingBlock,
        CursorStyle::Bar => SetCursorStyle::BlinkingBar,
    };

    enable_raw_mode()?;
    with_restore(
        || {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen, cursor_style)?;
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

            let events = EventChannel::with_terminal_input();
            let status = Driver::new(
                Context {
                    terminal: &mut terminal,
                    events: &events,
                    theme,
                    sink: history,
                },
                session_config,
                options,
                source,
            )
            .run();

            terminal.show_cursor()?;
            Ok(status?)
        },
        restore_terminal,
    )
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        LeaveAlternateScreen,
        SetCursorStyle::DefaultUserShape
    )
}

/// Run `body`, then `restore` even when `body` failed. The body's error is reported first.
fn with_restore<T>(
    body: impl FnOnce() -> Result<T, Box<dyn Error>>,
    restore: impl FnOnce() -> io::Result<()>,
) -> Result<T, Box<dyn Error>> {
    let result = body();
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

fn print_summary(history: &ResultsHistory, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(history.results())?);
        return Ok(());
    }

    for line in summary_lines(history) {
        println!("{line}");
    }
    Ok(())
}

fn summary_lines(history: &ResultsHistory) -> Vec<String> {
    let mut lines: Vec<String> = history
        .results()
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "test {}: {} wpm, {} cpm, {:.2}% accuracy, {} mistakes",
                i + 1,
                result.wpm,
                result.cpm,
                result.accuracy,
                result.mistakes.len()
            )
        })
        .collect();

    if history.results().len() > 1 {
        if let Some(best) = history.best_wpm() {
            lines.push(format!("best: {best} wpm"));
        }
    }
    lines
}
