//! Search index and query configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Smallest writer heap Tantivy accepts for a single indexing thread
pub(crate) const MIN_WRITER_HEAP_BYTES: usize = 15_000_000;

/// Search index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding one sub-directory per named index
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Name of the index games are imported into
    #[serde(default = "default_index_name")]
    pub name: String,
    /// Keep indexes in RAM only (nothing survives the process)
    #[serde(default)]
    pub in_memory: bool,
    /// Memory budget of the index writer in bytes
    #[serde(default = "default_writer_heap_bytes")]
    pub writer_heap_bytes: usize,
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "issdex")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".issdex"))
}

fn default_index_name() -> String {
    "iss".to_string()
}

fn default_writer_heap_bytes() -> usize {
    50_000_000
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            name: default_index_name(),
            in_memory: false,
            writer_heap_bytes: default_writer_heap_bytes(),
        }
    }
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Number of top hits fetched per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    1
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}
