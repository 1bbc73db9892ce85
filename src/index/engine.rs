//! The document-search capability the importer and query service run against

use crate::types::{GameDocument, GameField, Hit};
use std::time::Duration;
use thiserror::Error;

/// Structured query understood by every engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameQuery {
    /// Every document in the index
    MatchAll,
    /// Full-text match against one field
    Match { field: GameField, text: String },
    /// Full-text match against several fields; a document matching any of them qualifies
    MultiMatch { fields: Vec<GameField>, text: String },
}

impl GameQuery {
    /// Player lookup across all three seats
    pub fn identity(text: impl Into<String>) -> Self {
        Self::MultiMatch {
            fields: GameField::IDENTITY.to_vec(),
            text: text.into(),
        }
    }

    /// Free text lookup in the raw record
    pub fn detail(text: impl Into<String>) -> Self {
        Self::Match {
            field: GameField::CompleteGame,
            text: text.into(),
        }
    }
}

/// A document the engine refused during a bulk write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemFailure {
    /// Position of the document within the submitted batch
    pub position: usize,
    /// Engine-provided reason
    pub reason: String,
}

/// Engine reply to one bulk write
#[derive(Debug, Clone, Default)]
pub struct BulkResponse {
    /// Documents received in this round trip
    pub items: usize,
    /// Documents that were rejected
    pub failures: Vec<BulkItemFailure>,
    /// Time spent by the engine
    pub took: Duration,
}

impl BulkResponse {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Engine reply to one query
#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
    /// Number of matching documents, independent of how many hits were fetched
    pub total_hits: u64,
    /// Top hits, best first
    pub hits: Vec<Hit>,
    /// Time spent by the engine
    pub took: Duration,
}

/// Errors raised by a search engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid index name '{0}'")]
    InvalidIndexName(String),

    #[error("search engine unavailable: {0}")]
    Unavailable(String),

    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability of an external document-search engine.
///
/// Implementations are shared between the importer and the query service, so
/// every operation takes `&self`.
pub trait SearchEngine: Send + Sync {
    /// Whether the named index exists
    fn index_exists(&self, index: &str) -> Result<bool, EngineError>;

    /// Write a batch of documents in one round trip, creating the index if needed.
    ///
    /// Rejected documents are reported in the response; an `Err` means nothing
    /// can be said about the batch.
    fn bulk(&self, index: &str, documents: &[GameDocument]) -> Result<BulkResponse, EngineError>;

    /// Make every completed bulk write visible to searches, creating the index if needed
    fn refresh(&self, index: &str) -> Result<(), EngineError>;

    /// Run a query, returning at most `limit` hits.
    ///
    /// Querying an index that does not exist yields no hits.
    fn search(
        &self,
        index: &str,
        query: &GameQuery,
        limit: usize,
    ) -> Result<SearchResponse, EngineError>;

    /// Drop an index and all of its documents. Returns whether it existed.
    fn delete_index(&self, index: &str) -> Result<bool, EngineError>;
}
