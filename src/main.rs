use anyhow::{Context, Result};
use clap::Parser;
use snake_arena::game::{Difficulty, GameConfig, GameEngine, Mode, Session};
use snake_arena::modes::HumanMode;
use snake_arena::persistence::{JsonFileStore, ScoreStore};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_arena")]
#[command(version, about = "Multi-mode snake in the terminal")]
struct Cli {
    /// Ruleset for the first round (switch later with keys 1-5)
    #[arg(long, default_value = "classic")]
    mode: Mode,

    /// Speed tier; defaults to the last one played
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Cells per side of the square board, overrides the config file
    #[arg(long)]
    grid_size: Option<usize>,

    /// JSON file with game tuning values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the best score and last difficulty are kept
    #[arg(long, default_value = "snake_scores.json")]
    store: PathBuf,

    /// Write logs to this file (filtered by RUST_LOG); the terminal
    /// is owned by the game so nothing is logged without it
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {:?}", path))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    // Create game configuration from the file and CLI arguments
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(grid_size) = cli.grid_size {
        config.grid_size = grid_size;
    }

    let store = JsonFileStore::open(&cli.store)?;
    let difficulty = cli.difficulty.unwrap_or_else(|| store.difficulty());
    tracing::info!(store = ?store.path(), grid_size = config.grid_size, "starting");

    let engine = GameEngine::new(config, Box::new(store)).context("Failed to set up the game")?;
    let mut human_mode = HumanMode::new(Session::new(engine), cli.mode, difficulty)?;
    human_mode.run().await?;

    Ok(())
}
