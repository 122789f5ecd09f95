mod ui;

use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keystride::{
    config::{Config, ConfigOverrides, ConfigStore, FileConfigStore},
    error::KeystrideError,
    logging,
    metrics::SpeedSampling,
    passage::{Difficulty, PassagePool, QuoteSelector, SegmentOptions, Selection},
    runtime::{ChannelEventSource, Runner, TestEvent, TickSchedule},
    session::{SessionContext, SnapshotOutcome},
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};

const TICK_RATE_MS: u64 = 100;

/// typing proficiency test with difficulty-tiered passages and error heatmaps
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing proficiency test: type a few passages of the chosen difficulty, watch live accuracy, then review speed over time, the characters you miss most, and where those mistakes sit on the keyboard."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,

    /// passage difficulty tier
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// number of passages per test
    #[clap(short = 'n', long)]
    passages: Option<usize>,

    /// tiered passage corpus (JSON) to draw from instead of the built-in one
    #[clap(short = 'c', long)]
    corpus: Option<PathBuf>,

    /// custom prompt to type instead of drawn passages
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// how the speed chart is sampled
    #[clap(long, value_enum)]
    sampling: Option<SpeedSampling>,

    /// where to write the end-of-test error report
    #[clap(long)]
    report: Option<PathBuf>,

    /// seed passage selection for a reproducible test
    #[clap(long)]
    seed: Option<u64>,

    /// persist the given options as the new defaults
    #[clap(long)]
    save_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// split a plain-text file into a tiered passage corpus
    Segment {
        /// plain-text source, paragraphs separated by blank lines
        input: PathBuf,

        /// corpus file to write
        #[clap(short = 'o', long, default_value = "passages.json")]
        output: PathBuf,

        /// longest passage kept, in characters
        #[clap(long)]
        max_length: Option<usize>,

        /// shortest passage kept, in characters
        #[clap(long)]
        min_length: Option<usize>,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let (max_length, min_length) = match &self.command {
            Some(Command::Segment {
                max_length,
                min_length,
                ..
            }) => (*max_length, *min_length),
            None => (None, None),
        };
        ConfigOverrides {
            difficulty: self.difficulty,
            passages_per_test: self.passages,
            max_length,
            min_length,
            sampling: self.sampling,
            corpus_path: self.corpus.clone(),
            report_path: self.report.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
    Analytics,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub pool: PassagePool,
    pub selector: QuoteSelector,
    /// Fixed text typed on every test in place of drawn passages
    pub prompt: Option<String>,
    pub session: SessionContext,
    /// Text typed so far for the current passage
    pub typed: String,
    pub state: AppState,
}

fn draw_selection(
    config: &Config,
    pool: &PassagePool,
    selector: &mut QuoteSelector,
    prompt: Option<&str>,
) -> Selection {
    match prompt {
        Some(prompt) => Selection::custom(prompt),
        None => selector.select(pool, config.difficulty, config.passages_per_test()),
    }
}

impl App {
    pub fn new(config: Config, prompt: Option<String>, seed: Option<u64>) -> Self {
        let pool = match &config.corpus_path {
            Some(path) => PassagePool::load_or_empty(path),
            None => PassagePool::embedded(),
        };
        let selector = seed
            .map(QuoteSelector::seeded)
            .unwrap_or_else(QuoteSelector::from_entropy);
        Self::with_pool(config, pool, selector, prompt)
    }

    pub fn with_pool(
        config: Config,
        pool: PassagePool,
        mut selector: QuoteSelector,
        prompt: Option<String>,
    ) -> Self {
        let selection = draw_selection(&config, &pool, &mut selector, prompt.as_deref());
        let session = SessionContext::new(selection, config.sampling);
        Self {
            config,
            pool,
            selector,
            prompt,
            session,
            typed: String::new(),
            state: AppState::Typing,
        }
    }

    /// Handle one key press. Returns `false` once the app should quit.
    pub fn on_key(&mut self, key: KeyEvent, now: SystemTime) -> bool {
        if key.code == KeyCode::Esc {
            return false;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match self.state {
            AppState::Typing => match key.code {
                KeyCode::Char('c') if ctrl => self.end_test(now),
                KeyCode::Char(c) if !ctrl => {
                    self.typed.push(c);
                    self.apply_typed(now);
                }
                KeyCode::Backspace => {
                    if self.typed.pop().is_some() {
                        self.apply_typed(now);
                    }
                }
                _ => {}
            },
            AppState::Results | AppState::Analytics => match key.code {
                KeyCode::Char('c') if ctrl => return false,
                KeyCode::Char('r') => self.retry(),
                KeyCode::Char('n') => self.new_passages(),
                KeyCode::Char('a') => self.toggle_analytics(),
                _ => {}
            },
        }
        true
    }

    pub fn on_tick(&mut self, now: SystemTime) {
        if self.state == AppState::Typing {
            self.session.on_tick(now);
        }
    }

    /// Finish early, scoring only what has been typed
    pub fn end_test(&mut self, now: SystemTime) {
        self.session.end_test(now);
        self.show_results();
    }

    /// Same passages again, statistics cleared
    pub fn retry(&mut self) {
        self.session.retry();
        self.typed.clear();
        self.state = AppState::Typing;
    }

    pub fn new_passages(&mut self) {
        let selection = draw_selection(
            &self.config,
            &self.pool,
            &mut self.selector,
            self.prompt.as_deref(),
        );
        self.session.restart(selection);
        self.typed.clear();
        self.state = AppState::Typing;
    }

    pub fn toggle_analytics(&mut self) {
        self.state = match self.state {
            AppState::Results => AppState::Analytics,
            AppState::Analytics => AppState::Results,
            AppState::Typing => AppState::Typing,
        };
    }

    fn apply_typed(&mut self, now: SystemTime) {
        match self.session.on_snapshot(&self.typed, now) {
            SnapshotOutcome::Typing => {}
            SnapshotOutcome::PassageComplete => self.typed.clear(),
            SnapshotOutcome::TestComplete => self.show_results(),
        }
    }

    fn show_results(&mut self) {
        self.state = AppState::Results;
        self.write_report();
    }

    /// A failed write is logged and otherwise ignored
    fn write_report(&self) {
        let path = self.config.report_path();
        match self.session.error_report().write(&path) {
            Ok(()) => info!("error report written to {}", path.display()),
            Err(e) => warn!("{e}"),
        }
    }
}

/// Segment a raw text file and save the classified passages as a corpus
fn run_segment(
    input: &Path,
    output: &Path,
    options: SegmentOptions,
) -> Result<PassagePool, KeystrideError> {
    let text = fs::read_to_string(input).map_err(|source| KeystrideError::CorpusRead {
        path: input.to_path_buf(),
        source,
    })?;
    let pool = PassagePool::from_raw_text(&text, options);
    pool.save(output)?;
    info!("segmented {} into {} passages", input.display(), pool.len());
    Ok(pool)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init();

    let store = FileConfigStore::new();
    let config = store.load().merged(&cli.overrides());
    if cli.save_config {
        store.save(&config)?;
        info!("saved config to {}", store.path().display());
    }

    if let Some(Command::Segment { input, output, .. }) = &cli.command
    {
        let pool = run_segment(input, output, config.segment_options())?;
        println!(
            "wrote {} passages to {} (easy {}, medium {}, hard {})",
            pool.len(),
            output.display(),
            pool.tier(Difficulty::Easy).len(),
            pool.tier(Difficulty::Medium).len(),
            pool.tier(Difficulty::Hard).len()
        );
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(config, cli.prompt, cli.seed);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        ChannelEventSource::crossterm(),
        TickSchedule::every(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| draw(app, f))?;

    loop {
        match runner.step() {
            TestEvent::Tick => {
                app.on_tick(SystemTime::now());
                // Live figures only move while a passage is being typed
                if app.state == AppState::Typing && app.session.typing().has_started() {
                    terminal.draw(|f| draw(app, f))?;
                }
            }
            TestEvent::Resize => {
                terminal.draw(|f| draw(app, f))?;
            }
            TestEvent::Key(key) => {
                if !app.on_key(key, SystemTime::now()) {
                    break;
                }
                terminal.draw(|f| draw(app, f))?;
            }
        }
    }

    Ok(())
}

fn draw(app: &App, f: &mut Frame) {
    ui::screen::current_screen(app.state).render(app, f);
}
