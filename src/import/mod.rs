//! Bulk import of ISS game records
//!
//! ```text
//! RecordSource ──lines──▶ parse_line ──▶ BatchAccumulator ──full batch──▶ BulkLoader
//!                                                                           │
//!                                          ImportCoordinator ◀──outcomes────┘
//!                                   (existence check, workers, refresh, progress)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use issdex::config::ImportConfig;
//! use issdex::import::{ImportCoordinator, LineSource};
//! use issdex::index::TantivyEngine;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Arc::new(TantivyEngine::open(".issdex", 50_000_000)?);
//! let coordinator = ImportCoordinator::new(engine, "iss", ImportConfig::default())?;
//!
//! let result = coordinator.import_if_absent(LineSource::open("issgames.sgf")?)?;
//! println!("Imported {} games", result.documents_indexed());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod coordinator;
pub mod parser;
pub mod progress;
pub mod source;

// Re-export main types
pub use batch::BatchAccumulator;
pub use coordinator::ImportCoordinator;
pub use parser::{field_for_marker, parse_line, MARKER_FIELDS};
pub use progress::{print_summary, ImportProgress};
pub use source::{ImportError, ImportResult, LineSource, RecordSource};
