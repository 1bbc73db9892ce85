//! Batch accumulator for bulk submissions

use super::source::ImportError;
use crate::types::GameDocument;

/// Collects parsed games until a batch is full.
///
/// `add` reports readiness exactly once per batch, on the add that reaches the
/// threshold. The caller then takes the batch with `drain`; documents are never
/// dropped, even if more are added before draining.
#[derive(Debug)]
pub struct BatchAccumulator {
    threshold: usize,
    pending: Vec<GameDocument>,
    total_added: usize,
}

impl BatchAccumulator {
    pub fn new(threshold: usize) -> Result<Self, ImportError> {
        if threshold == 0 {
            return Err(ImportError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            threshold,
            pending: Vec::new(),
            total_added: 0,
        })
    }

    /// Add a document; returns `true` when the batch just became full
    pub fn add(&mut self, document: GameDocument) -> bool {
        self.pending.push(document);
        self.total_added += 1;
        self.pending.len() == self.threshold
    }

    /// Take the pending batch, leaving a fresh empty one behind
    pub fn drain(&mut self) -> Vec<GameDocument> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Documents added over the accumulator's lifetime
    pub fn total_added(&self) -> usize {
        self.total_added
    }
}
