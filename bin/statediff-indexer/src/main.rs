//! Entry point: parses the CLI, loads configuration, installs tracing and
//! (optionally) the metrics endpoint, and dispatches to one of the four
//! subcommands. Exits 0 on clean shutdown, non-zero on fatal init error.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use indexer_config::{Config, LogConfig};

#[derive(Debug, Parser)]
#[command(name = "statediff-indexer", version, about = "Ethereum state-diff indexer")]
struct Cli {
    /// Path to a TOML configuration file; env vars still override.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run live head-tracking until interrupt.
    Sync,
    /// Run the backfill coordinator until interrupt.
    Backfill,
    /// Run a bounded resync and exit.
    Resync,
    /// Fetch block+receipt RLP for a height range and write them to files.
    Util {
        #[arg(long)]
        start: u64,
        #[arg(long)]
        end: u64,
        #[arg(long, default_value = "./statediff-out")]
        out_dir: PathBuf,
    },
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let config = indexer_config::load(cli.config.as_deref())?;
    init_tracing(&config.log)?;

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(run(cli.command, config))
}

fn init_tracing(log: &LogConfig) -> eyre::Result<()> {
    let filter = EnvFilter::try_new(&log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match &log.logfile {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            subscriber.with_writer(std::sync::Mutex::new(file)).init();
        }
        None => subscriber.init(),
    }
    Ok(())
}

async fn run(command: Command, config: Config) -> eyre::Result<()> {
    if config.metrics {
        let addr = "0.0.0.0:9292".parse()?;
        indexer_metrics::install_recorder(addr).await?;
    }

    match command {
        Command::Sync => commands::sync::run(&config).await,
        Command::Backfill => commands::backfill::run(&config).await,
        Command::Resync => commands::resync::run(&config).await,
        Command::Util { start, end, out_dir } => {
            commands::util::run(&config, start, end, &out_dir).await
        }
    }
}
