//! Bulk loader: one batch, one round trip

use super::engine::{EngineError, SearchEngine};
use crate::types::GameDocument;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How a bulk submission went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStatus {
    /// Every document was accepted
    Success,
    /// The engine rejected `failed` documents
    PartialFailure { failed: usize },
}

/// Result of submitting one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Documents sent in this batch
    pub attempted: usize,
    pub status: BulkStatus,
    pub took: Duration,
}

impl BulkOutcome {
    pub fn failed(&self) -> usize {
        match self.status {
            BulkStatus::Success => 0,
            BulkStatus::PartialFailure { failed } => failed,
        }
    }

    pub fn is_partial_failure(&self) -> bool {
        matches!(self.status, BulkStatus::PartialFailure { .. })
    }
}

/// Submits batches to one named index.
///
/// No retries happen here: rejected items are data problems, and an
/// unreachable engine is the caller's call to make.
#[derive(Clone)]
pub struct BulkLoader {
    engine: Arc<dyn SearchEngine>,
    index: String,
}

impl BulkLoader {
    pub fn new(engine: Arc<dyn SearchEngine>, index: impl Into<String>) -> Self {
        Self {
            engine,
            index: index.into(),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Submit a batch in a single round trip
    pub fn submit(&self, batch: Vec<GameDocument>) -> Result<BulkOutcome, EngineError> {
        let attempted = batch.len();
        if attempted == 0 {
            return Ok(BulkOutcome {
                attempted,
                status: BulkStatus::Success,
                took: Duration::ZERO,
            });
        }

        let response = self.engine.bulk(&self.index, &batch)?;

        let status = if response.has_failures() {
            let failed = response.failures.len().min(attempted);
            if let Some(first) = response.failures.first() {
                warn!(
                    "{} of {} documents rejected by '{}', first at position {}: {}",
                    failed, attempted, self.index, first.position, first.reason
                );
            }
            BulkStatus::PartialFailure { failed }
        } else {
            BulkStatus::Success
        };

        debug!(
            "Bulk of {} documents to '{}' took {:?}",
            attempted, self.index, response.took
        );

        Ok(BulkOutcome {
            attempted,
            status,
            took: response.took,
        })
    }
}
