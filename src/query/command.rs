//! Console command routing and output

use crate::types::QueryResult;

/// One line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Player name lookup
    Identity(String),
    /// `detail <text>`: free text lookup in the raw record
    Detail(String),
    /// Empty line, `quit` or `exit`
    Quit,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Self::Quit;
        }

        match line.strip_prefix("detail") {
            Some("") => Self::Detail(String::new()),
            Some(rest) if rest.starts_with(char::is_whitespace) => {
                Self::Detail(rest.trim_start().to_string())
            }
            _ => Self::Identity(line.to_string()),
        }
    }
}

/// A console command together with what it found
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleOutcome {
    pub command: ConsoleCommand,
    pub result: QueryResult,
}

impl ConsoleOutcome {
    /// Lines printed for this outcome
    pub fn lines(&self) -> Vec<String> {
        let total = self.result.total_hits;
        let mut lines = Vec::with_capacity(3);

        match &self.command {
            ConsoleCommand::Identity(name) => {
                lines.push(format!("{} games found for {} playing.", total, name))
            }
            ConsoleCommand::Detail(text) => {
                lines.push(format!("{} games found for string like {}.", total, text))
            }
            ConsoleCommand::Quit => {}
        }

        lines.push(format!("{} ms", self.result.took_millis()));
        if let Some(hit) = &self.result.first_hit {
            lines.push(format!("First hit: {}", hit.source()));
        }
        lines
    }
}
