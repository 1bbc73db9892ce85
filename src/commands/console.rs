use super::search::print_outcome;
use super::{import_coordinator, open_engine, query_service};
use anyhow::{Context, Result};
use issdex::config::Config;
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::warn;

/// Import if needed, then answer searches typed on stdin until an empty
/// line, `quit`, `exit` or end of input
pub fn run_console(config: Config, path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| config.import.source_path.clone());
    let engine = open_engine(&config)?;

    println!("Please wait for the initialization of the db.");
    let result = import_coordinator(&config, engine.clone(), false)?
        .import_file_if_absent(&path)
        .context("Failed to initialize the game index")?;
    if result.has_failures() {
        warn!("{} games were rejected during import", result.failed_documents);
    }

    let service = query_service(&config, engine);
    println!("{} games in db.", service.game_count()?);
    println!(
        "You can search after player names or for game details. Type 'detail' followed by search string."
    );

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read console input")?;
        match service.dispatch(&line)? {
            Some(outcome) => print_outcome(&outcome),
            None => break,
        }
    }

    Ok(())
}
