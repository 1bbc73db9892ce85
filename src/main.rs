//! issdex: bulk loader and search for ISS Skat game records
//!
//! Imports an ISS game file into a full-text index and answers player and
//! detail searches from the command line or an interactive console.

use anyhow::Result;
use clap::{Parser, Subcommand};
use issdex::config::{Config, LogFormat, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

#[derive(Parser)]
#[command(name = "issdex")]
#[command(about = "Bulk loader and search for ISS Skat game records")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Data directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Index name
    #[arg(short, long)]
    index: Option<String>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a game record file unless the index already exists
    Import {
        /// Path to the game record file (defaults to the configured source)
        path: Option<PathBuf>,

        /// Games per bulk request
        #[arg(long)]
        batch_size: Option<usize>,

        /// Drop the existing index and import again
        #[arg(short, long)]
        force: bool,

        /// Quiet mode (no progress output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Search games by player name
    Search {
        /// Player name
        name: String,
    },

    /// Search games by any detail of the raw record
    Detail {
        /// Search text
        text: String,
    },

    /// Show index statistics
    Stats,

    /// Import if needed, then search interactively
    Console {
        /// Path to the game record file (defaults to the configured source)
        path: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let mut config = Config::load_or_default(&cli.config)?;

    if let Some(data_dir) = cli.data_dir {
        config.index.data_dir = data_dir;
    }
    if let Some(index) = cli.index {
        config.index.name = index;
    }
    if let Commands::Import {
        batch_size: Some(batch_size),
        ..
    } = &cli.command
    {
        config.import.batch_size = *batch_size;
    }
    config.validate()?;

    // Setup logging
    let log_level = config.logging.effective_level(cli.verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str()));

    match config.logging.format {
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    match cli.command {
        Commands::Import {
            path, force, quiet, ..
        } => commands::import::import_games(config, path, force, quiet),
        Commands::Search { name } => commands::search::search_identity(config, &name),
        Commands::Detail { text } => commands::search::search_detail(config, &text),
        Commands::Stats => commands::stats::show_stats(config),
        Commands::Console { path } => commands::console::run_console(config, path),
        Commands::Init { path } => commands::init::init_config(path),
    }
}
