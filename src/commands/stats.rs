use super::{open_engine, query_service};
use anyhow::Result;
use issdex::config::Config;
use tracing::info;

pub fn show_stats(config: Config) -> Result<()> {
    info!("Loading index statistics...");

    let service = query_service(&config, open_engine(&config)?);

    println!("\nissdex Statistics:");
    println!("==================");
    if config.index.in_memory {
        println!("Storage: in memory");
    } else {
        println!("Data directory: {}", config.index.data_dir.display());
    }
    println!("Index: {}", config.index.name);

    if !service.index_exists()? {
        println!("Index does not exist yet. Import games with:");
        println!("  issdex import <game-file>");
        return Ok(());
    }

    println!("Total games: {}", service.game_count()?);

    if !config.index.in_memory {
        let dir = config.index.data_dir.join(&config.index.name);
        println!("Index size: {} bytes", dir_size(&dir)?);
    }

    Ok(())
}

fn dir_size(dir: &std::path::Path) -> Result<u64> {
    let mut total = 0;
    for entry in std::fs::read_dir(dir)? {
        let metadata = entry?.metadata()?;
        if metadata.is_file() {
            total += metadata.len();
        }
    }
    Ok(total)
}
