use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use grid_snake::game::GameConfig;
use grid_snake::modes::HumanMode;
use grid_snake::persistence::SessionStore;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Snake on a grid, in the terminal")]
struct Cli {
    /// Board layout preset
    #[arg(long, default_value = "arena")]
    variant: Variant,

    /// JSON config file; overrides the preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid side length, overrides preset and config file
    #[arg(long)]
    size: Option<usize>,

    /// Starting tick interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Write logs to this file (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum Variant {
    /// 20x20 board with the origin in the corner
    Classic,
    /// 15x15 board centered on the origin
    Arena,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_tracing(path)?;
    }

    let config = build_config(&cli)?;
    tracing::info!(?config, "starting");

    let mut human_mode = HumanMode::new(config, SessionStore::default());
    human_mode.run().await?;

    Ok(())
}

fn build_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::from_file(path)?,
        None => match cli.variant {
            Variant::Classic => GameConfig::classic(),
            Variant::Arena => GameConfig::arena(),
        },
    };

    if let Some(size) = cli.size {
        config.grid_size = size;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.base_tick_ms = tick_ms;
        config.min_tick_ms = config.min_tick_ms.min(tick_ms);
    }

    config.validate().context("Invalid game configuration")?;
    Ok(config)
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {:?}", path))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
