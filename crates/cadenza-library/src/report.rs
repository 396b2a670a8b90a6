use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::TrackError;

/// A file left out of a batch, and why.
#[derive(Debug)]
pub struct SkippedTrack {
    pub path: PathBuf,
    pub reason: TrackError,
}

/// Outcome of running one operation over a list of files.
///
/// `done` holds the files that made it through, at their final paths, so a
/// later stage can pick up where this one stopped.
#[derive(Debug)]
pub struct BatchReport {
    pub operation: &'static str,
    pub done: Vec<PathBuf>,
    pub skipped: Vec<SkippedTrack>,
    pub renamed: usize,
    pub quarantined: usize,
}

impl BatchReport {
    #[must_use]
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            done: Vec::new(),
            skipped: Vec::new(),
            renamed: 0,
            quarantined: 0,
        }
    }

    pub fn record(&mut self, path: PathBuf) {
        self.done.push(path);
    }

    /// Record a skipped file and warn about it.
    pub fn skip(&mut self, path: PathBuf, reason: TrackError) {
        log::warn!("{}: skipping {}: {reason}", self.operation, path.display());
        self.skipped.push(SkippedTrack { path, reason });
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.done.len() + self.skipped.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Per-file progress callbacks for a batch operation.
///
/// Every batch calls `start` once, `advance` once per file after it has
/// been handled (done or skipped), then `finish`.
pub trait Progress {
    fn start(&mut self, _operation: &str, _total: usize) {}
    fn advance(&mut self, _path: &Path) {}
    fn finish(&mut self) {}
}

/// Progress sink that reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} of {} file(s) done, {} skipped",
            self.operation,
            self.done.len(),
            self.total(),
            self.skipped.len()
        )?;
        if self.renamed > 0 {
            write!(f, ", {} renamed", self.renamed)?;
        }
        if self.quarantined > 0 {
            write!(f, ", {} quarantined", self.quarantined)?;
        }
        Ok(())
    }
}
