//! Search index access
//!
//! The importer and query service only ever talk to a [`SearchEngine`]; the
//! Tantivy adapter is the implementation the binary wires in.

mod engine;
mod loader;
mod tantivy_engine;

pub use engine::{
    BulkItemFailure, BulkResponse, EngineError, GameQuery, SearchEngine, SearchResponse,
};
pub use loader::{BulkLoader, BulkOutcome, BulkStatus};
pub use tantivy_engine::TantivyEngine;
