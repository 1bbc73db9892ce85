//! Subcommand implementations

pub mod console;
pub mod import;
pub mod init;
pub mod search;
pub mod stats;

use anyhow::{Context, Result};
use issdex::config::Config;
use issdex::import::ImportCoordinator;
use issdex::index::{SearchEngine, TantivyEngine};
use issdex::query::QueryService;
use std::sync::Arc;

/// Open the search engine described by the configuration
pub fn open_engine(config: &Config) -> Result<Arc<dyn SearchEngine>> {
    let engine = TantivyEngine::from_config(&config.index).with_context(|| {
        format!(
            "Failed to open search index in {}",
            config.index.data_dir.display()
        )
    })?;
    Ok(Arc::new(engine))
}

pub fn query_service(config: &Config, engine: Arc<dyn SearchEngine>) -> QueryService {
    QueryService::new(engine, config.index.name.clone(), &config.query)
}

pub fn import_coordinator(
    config: &Config,
    engine: Arc<dyn SearchEngine>,
    quiet: bool,
) -> Result<ImportCoordinator> {
    Ok(
        ImportCoordinator::new(engine, config.index.name.clone(), config.import.clone())?
            .with_quiet(quiet),
    )
}
