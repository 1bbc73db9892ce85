//! Bulk import configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound for concurrently submitted batches
pub const MAX_IN_FLIGHT_BATCHES: usize = 16;

/// Bulk import configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Game record file imported when no path is given
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,
    /// Documents per bulk submission
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Batches that may be submitted to the index at the same time
    #[serde(default = "default_max_in_flight_batches")]
    pub max_in_flight_batches: usize,
}

fn default_source_path() -> PathBuf {
    PathBuf::from("issgames.sgf")
}

fn default_batch_size() -> usize {
    10_000
}

fn default_max_in_flight_batches() -> usize {
    1
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            batch_size: default_batch_size(),
            max_in_flight_batches: default_max_in_flight_batches(),
        }
    }
}

impl ImportConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_in_flight_batches(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight_batches = max_in_flight;
        self
    }
}
