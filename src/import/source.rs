//! Record sources and import result types

use crate::index::EngineError;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// A finite, line-oriented sequence of game records.
///
/// Each call to `records` continues where the previous one stopped; open a
/// new source to start over.
pub trait RecordSource: Send {
    /// Iterate over raw record lines, without line terminators
    fn records(&mut self) -> Box<dyn Iterator<Item = io::Result<String>> + '_>;

    /// Total size in bytes if known (for progress reporting)
    fn size_hint_bytes(&self) -> Option<u64>;

    /// Source name for display
    fn source_name(&self) -> &str;
}

/// Record source reading one record per line from any buffered reader.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the run.
pub struct LineSource<R> {
    reader: R,
    name: String,
    size: Option<u64>,
}

impl LineSource<BufReader<File>> {
    /// Open a record file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ImportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let size = file.metadata().ok().map(|m| m.len());

        Ok(Self {
            reader: BufReader::new(file),
            name: path.display().to_string(),
            size,
        })
    }
}

impl<R: BufRead + Send> LineSource<R> {
    /// Wrap an already open reader
    pub fn from_reader(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            size: None,
        }
    }
}

impl<R: BufRead + Send> RecordSource for LineSource<R> {
    fn records(&mut self) -> Box<dyn Iterator<Item = io::Result<String>> + '_> {
        Box::new(Lines {
            reader: &mut self.reader,
            buf: Vec::new(),
        })
    }

    fn size_hint_bytes(&self) -> Option<u64> {
        self.size
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

struct Lines<'a, R> {
    reader: &'a mut R,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for Lines<'_, R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                // CRLF, or a bare CR on a final line without a newline
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Summary of one import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    /// The target index already existed, nothing was imported
    pub skipped: bool,
    /// Lines read from the source
    pub lines_read: usize,
    /// Empty lines that produced no document
    pub blank_lines: usize,
    /// Documents handed to the index
    pub documents_submitted: usize,
    /// Bulk round trips made
    pub batches_submitted: usize,
    /// Bulk round trips where at least one document was rejected
    pub batches_with_failures: usize,
    /// Documents rejected by the index
    pub failed_documents: usize,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl ImportResult {
    pub(crate) fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }

    /// Documents the index accepted
    pub fn documents_indexed(&self) -> usize {
        self.documents_submitted.saturating_sub(self.failed_documents)
    }

    pub fn has_failures(&self) -> bool {
        self.batches_with_failures > 0
    }

    /// Documents per second over the run
    pub fn docs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.documents_submitted as f64 / secs
        } else {
            0.0
        }
    }
}

/// Errors that can occur during import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to open record source '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("record source became unreadable after {} submitted documents: {source}", .partial.documents_submitted)]
    SourceRead {
        #[source]
        source: io::Error,
        partial: ImportResult,
    },

    #[error("search index unavailable after {} submitted documents: {source}", .partial.documents_submitted)]
    IndexUnavailable {
        #[source]
        source: EngineError,
        partial: ImportResult,
    },

    #[error("invalid import configuration: {0}")]
    Config(String),
}

impl ImportError {
    /// Totals accumulated before a fatal error
    pub fn partial(&self) -> Option<&ImportResult> {
        match self {
            Self::SourceRead { partial, .. } | Self::IndexUnavailable { partial, .. } => {
                Some(partial)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(source: &mut impl RecordSource) -> Vec<String> {
        source.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_lines_without_terminators() {
        let mut source = LineSource::from_reader(Cursor::new("a\nb\r\n\nc"), "mem");
        assert_eq!(collect(&mut source), vec!["a", "b", "", "c"]);
        assert_eq!(source.source_name(), "mem");
    }

    #[test]
    fn test_final_carriage_return_stripped() {
        let mut source = LineSource::from_reader(Cursor::new("ID[0]\r\nID[1]\r"), "mem");
        assert_eq!(collect(&mut source), vec!["ID[0]", "ID[1]"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let bytes: Vec<u8> = b"P0[M\xfcller]\n".to_vec();
        let mut source = LineSource::from_reader(Cursor::new(bytes), "mem");
        let lines = collect(&mut source);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("P0[M"));
        assert!(lines[0].contains('\u{FFFD}'));
    }

    #[test]
    fn test_open_missing_file() {
        let err = LineSource::open("/definitely/not/here.sgf").err().unwrap();
        assert!(matches!(err, ImportError::Open { .. }));
        assert!(err.to_string().contains("/definitely/not/here.sgf"));
    }

    #[test]
    fn test_open_reports_size() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("games.sgf");
        std::fs::write(&path, "ID[1]\nID[2]\n").unwrap();

        let mut source = LineSource::open(&path).unwrap();
        assert_eq!(source.size_hint_bytes(), Some(12));
        assert_eq!(collect(&mut source), vec!["ID[1]", "ID[2]"]);
    }

    #[test]
    fn test_partial_result_available_on_fatal_errors() {
        let partial = ImportResult {
            documents_submitted: 20,
            ..Default::default()
        };
        let err = ImportError::SourceRead {
            source: io::Error::new(io::ErrorKind::Other, "disk gone"),
            partial,
        };
        assert_eq!(err.partial().map(|p| p.documents_submitted), Some(20));
        assert!(err.to_string().contains("20 submitted documents"));
        assert!(ImportError::Config("x".into()).partial().is_none());
    }

    #[test]
    fn test_documents_indexed_excludes_failures() {
        let result = ImportResult {
            documents_submitted: 10,
            failed_documents: 3,
            batches_with_failures: 1,
            ..Default::default()
        };
        assert_eq!(result.documents_indexed(), 7);
        assert!(result.has_failures());
    }
}
