use super::{import_coordinator, open_engine};
use anyhow::{Context, Result};
use issdex::config::Config;
use issdex::import::{print_summary, ImportError};
use std::path::PathBuf;
use tracing::{info, warn};

pub fn import_games(config: Config, path: Option<PathBuf>, force: bool, quiet: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| config.import.source_path.clone());
    let engine = open_engine(&config)?;
    let coordinator = import_coordinator(&config, engine, quiet)?;

    info!(
        "Importing from: {} (batch size {}, {} in flight)",
        path.display(),
        config.import.batch_size,
        config.import.max_in_flight_batches
    );

    let outcome = if force {
        coordinator.reimport_file(&path)
    } else {
        coordinator.import_file_if_absent(&path)
    };

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            if let Some(partial) = e.partial() {
                warn!(
                    "Import aborted after {} games in {} batches",
                    partial.documents_submitted, partial.batches_submitted
                );
                if !quiet {
                    print_summary(partial);
                }
            }
            let hint = match e {
                ImportError::Open { .. } => "Check the game record path",
                _ => "Import failed",
            };
            return Err(e).context(hint);
        }
    };

    if result.skipped {
        println!(
            "Index '{}' already exists, nothing imported. Use --force to import again.",
            config.index.name
        );
        return Ok(());
    }

    if !quiet {
        print_summary(&result);
    }
    if result.has_failures() {
        warn!(
            "{} games were rejected in {} batches",
            result.failed_documents, result.batches_with_failures
        );
    }

    Ok(())
}
