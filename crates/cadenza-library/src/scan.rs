use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use cadenza_core::Track;

/// Directory inside a source that receives unparseable files.
pub const QUARANTINE_DIR: &str = "_invalid";

/// Walks a directory for MP3 files.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    max_depth: Option<usize>,
}

impl Scanner {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: None,
        }
    }

    /// Limit recursion. Depth 1 means only files directly in the root.
    ///
    /// # Errors
    ///
    /// Returns an error for a depth of 0, which would match nothing.
    pub fn with_depth(mut self, depth: Option<usize>) -> anyhow::Result<Self> {
        if depth == Some(0) {
            anyhow::bail!("Depth must be at least 1 (1 = only the top directory)");
        }
        self.max_depth = depth;
        Ok(self)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All supported files below the root, sorted by path.
    ///
    /// The quarantine directory is never descended into. Unreadable
    /// entries are logged and skipped.
    #[must_use]
    pub fn files(&self) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut files: Vec<PathBuf> = walker
            .into_iter()
            .filter_entry(|entry| {
                !(entry.depth() > 0
                    && entry.file_type().is_dir()
                    && entry.file_name() == QUARANTINE_DIR)
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && Track::is_supported(entry.path()))
            .map(walkdir::DirEntry::into_path)
            .collect();

        files.sort();
        log::debug!("Found {} files under {}", files.len(), self.root.display());
        files
    }
}

/// Modification time of a file as UTC.
pub fn modified_time(path: &Path) -> std::io::Result<DateTime<Utc>> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(modified.into())
}
