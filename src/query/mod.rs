//! Read-only queries over the game index
//!
//! Identity searches match a player name in any seat; detail searches match
//! free text anywhere in the raw record.

mod command;
mod service;

pub use command::{ConsoleCommand, ConsoleOutcome};
pub use service::{QueryError, QueryService};
