use super::{open_engine, query_service};
use anyhow::Result;
use issdex::config::Config;
use issdex::query::{ConsoleCommand, ConsoleOutcome};
use tracing::info;

pub fn search_identity(config: Config, name: &str) -> Result<()> {
    info!("Searching for player: {}", name);
    let service = query_service(&config, open_engine(&config)?);
    let result = service.search_by_identity(name)?;

    print_outcome(&ConsoleOutcome {
        command: ConsoleCommand::Identity(name.to_string()),
        result,
    });
    Ok(())
}

pub fn search_detail(config: Config, text: &str) -> Result<()> {
    info!("Searching for detail: {}", text);
    let service = query_service(&config, open_engine(&config)?);
    let result = service.search_by_detail(text)?;

    print_outcome(&ConsoleOutcome {
        command: ConsoleCommand::Detail(text.to_string()),
        result,
    });
    Ok(())
}

pub fn print_outcome(outcome: &ConsoleOutcome) {
    for line in outcome.lines() {
        println!("{}", line);
    }
}
