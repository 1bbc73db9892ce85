//! Import coordinator that orchestrates the bulk import process
//!
//! One run is `check existence -> (skip | ingest) -> refresh`. Ingest reads
//! the source on the calling thread and hands full batches to a small pool of
//! scoped submit workers over a rendezvous channel, so at most
//! `max_in_flight_batches` bulk requests are outstanding and the reader never
//! runs more than one batch ahead.

use super::batch::BatchAccumulator;
use super::parser::parse_line;
use super::progress::ImportProgress;
use super::source::{ImportError, ImportResult, LineSource, RecordSource};
use crate::config::{ImportConfig, MAX_IN_FLIGHT_BATCHES};
use crate::index::{BulkLoader, EngineError, SearchEngine};
use crate::types::GameDocument;
use parking_lot::Mutex;
use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info};

/// Import coordinator for game record files
pub struct ImportCoordinator {
    engine: Arc<dyn SearchEngine>,
    loader: BulkLoader,
    config: ImportConfig,
    /// Quiet mode
    quiet: bool,
}

impl ImportCoordinator {
    /// Create a coordinator importing into the named index
    pub fn new(
        engine: Arc<dyn SearchEngine>,
        index: impl Into<String>,
        config: ImportConfig,
    ) -> Result<Self, ImportError> {
        if config.batch_size == 0 {
            return Err(ImportError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        if config.max_in_flight_batches == 0 || config.max_in_flight_batches > MAX_IN_FLIGHT_BATCHES
        {
            return Err(ImportError::Config(format!(
                "max in-flight batches must be between 1 and {}, got {}",
                MAX_IN_FLIGHT_BATCHES, config.max_in_flight_batches
            )));
        }

        let loader = BulkLoader::new(engine.clone(), index);
        Ok(Self {
            engine,
            loader,
            config,
            quiet: false,
        })
    }

    /// Set quiet mode (no progress output)
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Target index name
    pub fn index(&self) -> &str {
        self.loader.index()
    }

    /// Import the source unless the target index already exists.
    ///
    /// An existing index, even an empty one, means the import already
    /// happened; the source is not read at all in that case.
    pub fn import_if_absent<S: RecordSource>(&self, mut source: S) -> Result<ImportResult, ImportError> {
        if self.index_present()? {
            return Ok(ImportResult::skipped());
        }

        info!(
            "Importing games from {} into '{}'",
            source.source_name(),
            self.index()
        );
        self.ingest(&mut source)
    }

    /// Like [`import_if_absent`](Self::import_if_absent), but only opens the
    /// file once it is known to be needed
    pub fn import_file_if_absent(&self, path: impl AsRef<Path>) -> Result<ImportResult, ImportError> {
        if self.index_present()? {
            return Ok(ImportResult::skipped());
        }
        self.import_if_absent(LineSource::open(path)?)
    }

    /// Drop the target index, then import the source into a fresh one
    pub fn reimport<S: RecordSource>(&self, source: S) -> Result<ImportResult, ImportError> {
        self.drop_index()?;
        self.import_if_absent(source)
    }

    /// Drop the target index, then import the file into a fresh one.
    /// The file is opened first, so a missing file leaves the index alone.
    pub fn reimport_file(&self, path: impl AsRef<Path>) -> Result<ImportResult, ImportError> {
        let source = LineSource::open(path)?;
        self.reimport(source)
    }

    fn index_present(&self) -> Result<bool, ImportError> {
        let exists = self
            .engine
            .index_exists(self.index())
            .map_err(|source| ImportError::IndexUnavailable {
                source,
                partial: ImportResult::default(),
            })?;
        if exists {
            info!("Index '{}' already exists, skipping import", self.index());
        }
        Ok(exists)
    }

    fn drop_index(&self) -> Result<(), ImportError> {
        let removed = self
            .engine
            .delete_index(self.index())
            .map_err(|source| ImportError::IndexUnavailable {
                source,
                partial: ImportResult::default(),
            })?;
        if removed {
            info!("Dropped existing index '{}'", self.index());
        }
        Ok(())
    }

    fn ingest<S: RecordSource>(&self, source: &mut S) -> Result<ImportResult, ImportError> {
        let progress = ImportProgress::new(source.source_name(), source.size_hint_bytes(), self.quiet);
        let mut accumulator = BatchAccumulator::new(self.config.batch_size)?;
        let workers = self.config.max_in_flight_batches;

        let (batches, queue) = mpsc::sync_channel::<Vec<GameDocument>>(0);
        // Only the workers hold the receiver, so once the last one exits
        // (even by panicking) the reader's send fails instead of blocking.
        let queue = Arc::new(Mutex::new(queue));
        let fatal: Mutex<Option<EngineError>> = Mutex::new(None);

        let (read_result, panicked) = thread::scope(|scope| {
            let (progress, fatal) = (&progress, &fatal);
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let queue = Arc::clone(&queue);
                    scope.spawn(move || self.submit_batches(&queue, progress, fatal))
                })
                .collect();
            drop(queue);

            let read_result = read_batches(source, &mut accumulator, batches, progress);
            let panicked = handles
                .into_iter()
                .map(|handle| handle.join())
                .filter(Result::is_err)
                .count();
            (read_result, panicked)
        });

        if let Some(source) = fatal.into_inner() {
            return Err(ImportError::IndexUnavailable {
                source,
                partial: progress.snapshot(),
            });
        }

        if panicked > 0 {
            error!("{} bulk worker(s) for '{}' panicked", panicked, self.index());
            progress.cancel();
            return Err(ImportError::IndexUnavailable {
                source: EngineError::Unavailable(format!("{} bulk worker(s) panicked", panicked)),
                partial: progress.snapshot(),
            });
        }

        if let Err(source) = read_result {
            error!("Reading game records failed: {}", source);
            progress.cancel();
            return Err(ImportError::SourceRead {
                source,
                partial: progress.snapshot(),
            });
        }

        self.engine.refresh(self.index()).map_err(|source| {
            progress.cancel();
            ImportError::IndexUnavailable {
                source,
                partial: progress.snapshot(),
            }
        })?;

        progress.finish();
        let result = progress.snapshot();
        info!(
            "Import into '{}' finished: {} games in {} batches ({} rejected) in {:.1}s",
            self.index(),
            result.documents_submitted,
            result.batches_submitted,
            result.failed_documents,
            result.elapsed.as_secs_f64()
        );
        Ok(result)
    }

    /// Worker loop: submit batches until the reader hangs up.
    ///
    /// After a fatal engine error the worker keeps draining the queue without
    /// submitting, so a reader blocked on send is released.
    fn submit_batches(
        &self,
        queue: &Mutex<Receiver<Vec<GameDocument>>>,
        progress: &ImportProgress,
        fatal: &Mutex<Option<EngineError>>,
    ) {
        loop {
            let next = queue.lock().recv();
            let Ok(batch) = next else {
                break;
            };
            if progress.is_cancelled() {
                debug!("Discarding batch of {} after cancellation", batch.len());
                continue;
            }

            match self.loader.submit(batch) {
                Ok(outcome) => progress.batch_submitted(&outcome),
                Err(e) => {
                    error!("Bulk submission to '{}' failed: {}", self.index(), e);
                    fatal.lock().get_or_insert(e);
                    progress.cancel();
                }
            }
        }
    }
}

/// Reader side: parse lines into batches and hand full ones to the workers.
/// Dropping `batches` on return tells the workers to finish.
fn read_batches<S: RecordSource>(
    source: &mut S,
    accumulator: &mut BatchAccumulator,
    batches: SyncSender<Vec<GameDocument>>,
    progress: &ImportProgress,
) -> io::Result<()> {
    for line in source.records() {
        if progress.is_cancelled() {
            return Ok(());
        }

        let line = line?;
        progress.line_read(&line);
        if line.is_empty() {
            continue;
        }

        if accumulator.add(parse_line(&line)) && batches.send(accumulator.drain()).is_err() {
            return Ok(());
        }
    }

    if !accumulator.is_empty() && !progress.is_cancelled() {
        // Workers only hang up after a fatal error, which is reported separately
        let _ = batches.send(accumulator.drain());
    }
    Ok(())
}
