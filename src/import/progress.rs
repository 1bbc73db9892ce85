//! Progress tracking for game imports

use super::source::ImportResult;
use crate::index::BulkOutcome;
use crate::util::truncate_str;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;
use tracing::info;

/// Progress tracker shared by the reader and the submitting workers
pub struct ImportProgress {
    /// Progress bar (None if running in quiet mode)
    progress_bar: Option<ProgressBar>,
    start_time: Instant,
    lines_read: AtomicUsize,
    blank_lines: AtomicUsize,
    bytes_read: AtomicU64,
    docs_submitted: AtomicUsize,
    batches_submitted: AtomicUsize,
    batches_with_failures: AtomicUsize,
    failed_documents: AtomicUsize,
    cancelled: AtomicBool,
}

impl ImportProgress {
    /// Create a new progress tracker; a known source size gives a byte bar,
    /// otherwise a spinner is shown
    pub fn new(source_name: &str, total_bytes: Option<u64>, quiet: bool) -> Self {
        let progress_bar = if !quiet {
            let pb = match total_bytes {
                Some(total) => {
                    let pb = ProgressBar::new(total);
                    pb.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_bar())
                            .progress_chars("#>-"),
                    );
                    pb
                }
                None => {
                    let pb = ProgressBar::new_spinner();
                    pb.set_style(
                        ProgressStyle::default_spinner()
                            .template("{spinner:.green} [{elapsed_precise}] {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                    );
                    pb
                }
            };
            pb.set_message(truncate_str(source_name, 40));
            Some(pb)
        } else {
            None
        };

        Self {
            progress_bar,
            start_time: Instant::now(),
            lines_read: AtomicUsize::new(0),
            blank_lines: AtomicUsize::new(0),
            bytes_read: AtomicU64::new(0),
            docs_submitted: AtomicUsize::new(0),
            batches_submitted: AtomicUsize::new(0),
            batches_with_failures: AtomicUsize::new(0),
            failed_documents: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Record one line read from the source
    pub fn line_read(&self, line: &str) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
        // +1 for the stripped terminator
        let len = line.len() as u64 + 1;
        let bytes = self.bytes_read.fetch_add(len, Ordering::Relaxed) + len;

        if line.is_empty() {
            self.blank_lines.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(ref pb) = self.progress_bar {
            pb.set_position(bytes);
        }
    }

    /// Record a finished bulk submission
    pub fn batch_submitted(&self, outcome: &BulkOutcome) {
        let submitted =
            self.docs_submitted.fetch_add(outcome.attempted, Ordering::Relaxed) + outcome.attempted;
        self.batches_submitted.fetch_add(1, Ordering::Relaxed);

        if outcome.is_partial_failure() {
            self.batches_with_failures.fetch_add(1, Ordering::Relaxed);
            self.failed_documents
                .fetch_add(outcome.failed(), Ordering::Relaxed);
            info!("{} games imported. Some have failures.", submitted);
        } else {
            info!("{} games imported.", submitted);
        }

        if let Some(ref pb) = self.progress_bar {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                submitted as f64 / elapsed
            } else {
                0.0
            };
            pb.set_message(format!("{} games | {:.1} games/s", submitted, rate));
        }
    }

    /// Current totals
    pub fn snapshot(&self) -> ImportResult {
        ImportResult {
            skipped: false,
            lines_read: self.lines_read.load(Ordering::Relaxed),
            blank_lines: self.blank_lines.load(Ordering::Relaxed),
            documents_submitted: self.docs_submitted.load(Ordering::Relaxed),
            batches_submitted: self.batches_submitted.load(Ordering::Relaxed),
            batches_with_failures: self.batches_with_failures.load(Ordering::Relaxed),
            failed_documents: self.failed_documents.load(Ordering::Relaxed),
            elapsed: self.start_time.elapsed(),
        }
    }

    /// Check if import has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Cancel the import
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(ref pb) = self.progress_bar {
            pb.abandon_with_message("Cancelled");
        }
    }

    /// Finish the progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            let stats = self.snapshot();
            pb.finish_with_message(format!(
                "Done! {} games imported, {} rejected, {:.1} games/s",
                stats.documents_indexed(),
                stats.failed_documents,
                stats.docs_per_second()
            ));
        }
    }
}

/// Print an import summary to the console
pub fn print_summary(result: &ImportResult) {
    println!("\nImport Summary");
    println!("==============");
    println!("Lines read:          {}", result.lines_read);
    println!("Blank lines:         {}", result.blank_lines);
    println!("Games submitted:     {}", result.documents_submitted);
    println!("Games rejected:      {}", result.failed_documents);
    println!("Bulk requests:       {}", result.batches_submitted);
    println!("  with failures:     {}", result.batches_with_failures);
    println!("Elapsed time:        {:.1}s", result.elapsed.as_secs_f64());
    println!("Processing rate:     {:.1} games/s", result.docs_per_second());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::BulkStatus;
    use std::time::Duration;

    fn outcome(attempted: usize, status: BulkStatus) -> BulkOutcome {
        BulkOutcome {
            attempted,
            status,
            took: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_progress_tracking() {
        let progress = ImportProgress::new("games.sgf", Some(1000), true);

        progress.line_read("ID[1]");
        progress.line_read("");
        progress.line_read("ID[2]");
        progress.batch_submitted(&outcome(2, BulkStatus::Success));
        progress.batch_submitted(&outcome(3, BulkStatus::PartialFailure { failed: 1 }));

        let stats = progress.snapshot();
        assert_eq!(stats.lines_read, 3);
        assert_eq!(stats.blank_lines, 1);
        assert_eq!(stats.documents_submitted, 5);
        assert_eq!(stats.batches_submitted, 2);
        assert_eq!(stats.batches_with_failures, 1);
        assert_eq!(stats.failed_documents, 1);
        assert_eq!(stats.documents_indexed(), 4);
        assert!(!stats.skipped);
    }

    #[test]
    fn test_cancellation() {
        let progress = ImportProgress::new("games.sgf", None, true);

        assert!(!progress.is_cancelled());
        progress.cancel();
        assert!(progress.is_cancelled());
    }
}
