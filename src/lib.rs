//! issdex: bulk loader and search for ISS Skat game records
//!
//! Game records from the International Skat Server come one per line in a
//! bracketed `MARKER[payload]` format. issdex:
//! - parses each line into a [`GameDocument`] (game id, the three seats, the raw line)
//! - bulk-loads the documents into a full-text index, once
//! - answers player ("identity") and free-text ("detail") searches
//!
//! Everything talks to the index through [`index::SearchEngine`]; the
//! Tantivy-backed [`index::TantivyEngine`] is the stock implementation.

pub mod config;
pub mod import;
pub mod index;
pub mod query;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;
