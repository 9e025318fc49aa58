use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{error, info};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
};

use tapetype::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    history::ResultsLog,
    passage::{self, FilePassage, StaticPassage, DEFAULT_PASSAGE},
    reconciler::BulkInputPolicy,
    runtime::{CrosstermEventSource, EngineEvent, FixedTicker, Runner},
    SessionConfig,
};

/// typing speed exerciser with exact backspace semantics
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a passage against a countdown. Every keystroke is checked as you go, backspace undoes exactly one character, and the session ends when time runs out or the passage is done."
)]
pub struct Cli {
    /// number of seconds to run the session
    #[clap(short = 's', long, value_parser = clap::value_parser!(u32).range(1..))]
    secs: Option<u32>,

    /// custom passage to type
    #[clap(short = 'p', long, conflicts_with = "passage_file")]
    prompt: Option<String>,

    /// read the passage from a text file (loaded in the background)
    #[clap(short = 'f', long)]
    passage_file: Option<PathBuf>,

    /// allow backspace after the clock has run out
    #[clap(long)]
    allow_post_expiry_correction: bool,

    /// how to treat input that changes by several characters at once
    #[clap(long, value_enum)]
    bulk_input: Option<BulkInputPolicy>,

    /// persist the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line values win over stored ones.
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(secs) = self.secs {
            cfg.session_secs = secs;
        }
        if self.allow_post_expiry_correction {
            cfg.allow_post_expiry_correction = true;
        }
        if let Some(policy) = self.bulk_input {
            cfg.bulk_input = policy;
        }
        if let Some(prompt) = &self.prompt {
            cfg.passage = Some(prompt.clone());
        }
        cfg
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        if fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    // the terminal belongs to the UI, so logs go to a file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .ok();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let store = FileConfigStore::new();
    let cfg = cli.apply(store.load());
    if cli.save_config {
        store.save(&cfg)?;
        info!("saved config to {}", store.path().display());
    }

    // a file passage arrives later through the event channel
    let initial = match (&cli.passage_file, &cfg.passage) {
        (Some(_), _) => String::new(),
        (None, Some(p)) => p.clone(),
        (None, None) => DEFAULT_PASSAGE.to_string(),
    };

    let mut app = App::new(SessionConfig::from(&cfg), &initial);
    if let Some(path) = AppDirs::history_path() {
        app = app.with_results_log(ResultsLog::new(path));
    }
    if let Some(path) = &cli.passage_file {
        app = app.with_passage_source(FilePassage::new(path));
    } else if let Some(p) = &cfg.passage {
        app = app.with_passage_source(StaticPassage(p.clone()));
    }

    let events = CrosstermEventSource::new();
    if let Some(path) = &cli.passage_file {
        passage::spawn_fetch(FilePassage::new(path), events.sender());
    }
    let mut runner = Runner::new(events, FixedTicker::default());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &outcome {
        error!("session aborted: {}", e);
    }
    outcome
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<CrosstermEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            EngineEvent::Tick => app.on_tick()?,
            EngineEvent::Resize => {}
            EngineEvent::Passage(text) => app.on_passage(&text)?,
            EngineEvent::Key(key) => {
                if !runner.follow(app.handle_key(key)?) {
                    break;
                }
            }
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}
