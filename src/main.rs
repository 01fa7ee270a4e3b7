mod binder;
mod config;
mod data;
mod error;
mod map_draw;
mod orchestrator;
mod price_model;
mod projection;
mod selection;
mod state;
mod ui;

use clap::Parser;
use config::Config;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use data::DataCache;
use error::AppError;
use orchestrator::{Collaborators, Orchestrator};
use price_model::LinearPriceModel;
use ratatui::{backend::CrosstermBackend, Terminal};
use state::AppState;
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

/// Drill down from zipcode to address and see the predicted sale price on a map.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Directory holding config.json, the registry snapshot and the price model
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Log file; defaults to the one named in config.json
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<(), AppError> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

fn open_session(args: &Args, config: &Config) -> Result<Orchestrator, AppError> {
    let registry = DataCache::new(&args.data_dir, &config.units_file)?;
    let model = LinearPriceModel::load(args.data_dir.join(&config.model_file))?;
    Ok(Orchestrator::new(
        config.zipcodes.clone(),
        config.default_view.to_view_bounds(),
        config.currency.clone(),
        Collaborators {
            roads: Box::new(registry.clone()),
            addresses: Box::new(registry.clone()),
            units: Box::new(registry),
            model: Box::new(model),
        },
    ))
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let config = Config::load(&args.data_dir)?;
    let log_file = args.log_file.clone().unwrap_or_else(|| PathBuf::from(&config.log_file));
    init_logging(&log_file)?;
    tracing::info!(data_dir = %args.data_dir.display(), zipcodes = ?config.zipcodes, "starting");

    let mut state = AppState::new(open_session(&args, &config)?);
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| ui::draw(f, &state))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event::read()? {
                if state.handle_input(code) {
                    break;
                }
            }
        }
        state.tick();
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    tracing::info!("bye");
    Ok(())
}
