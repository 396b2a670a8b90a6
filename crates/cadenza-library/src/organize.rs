//! Placing files into the library.
//!
//! The library is laid out as `<destination>/<artist>/<file name>`, where
//! the artist comes from the file's ID3 tag.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::CollisionPolicy;
use crate::error::{TrackError, TrackResult};
use crate::report::{BatchReport, Progress};
use crate::tags::read_track;

/// Whether the source file survives a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Copy,
    Move,
}

impl Transfer {
    fn operation(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Move => "move",
        }
    }
}

/// Copies or moves tracks into an artist-per-directory library.
#[derive(Debug, Clone)]
pub struct Organizer {
    destination: PathBuf,
    mode: Transfer,
    on_collision: CollisionPolicy,
}

impl Organizer {
    #[must_use]
    pub fn new(destination: PathBuf, mode: Transfer, on_collision: CollisionPolicy) -> Self {
        Self {
            destination,
            mode,
            on_collision,
        }
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Place every file, continuing past failures.
    pub fn organize(&self, files: &[PathBuf], progress: &mut dyn Progress) -> BatchReport {
        let mut report = BatchReport::new(self.mode.operation());
        progress.start(report.operation, files.len());

        for (i, path) in files.iter().enumerate() {
            log::debug!("[{}/{}] {}", i + 1, files.len(), path.display());
            match self.place(path) {
                Ok(target) => report.record(target),
                Err(e) => report.skip(path.clone(), e),
            }
            progress.advance(path);
        }

        progress.finish();
        report
    }

    /// Where a file belongs in the library.
    pub fn target_for(&self, path: &Path) -> TrackResult<PathBuf> {
        let track = read_track(path)?;
        let artist = track.artist().ok_or(TrackError::MissingArtist)?;
        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

        Ok(self
            .destination
            .join(sanitize_dir_name(artist))
            .join(file_name))
    }

    /// Place one file and return its new path.
    pub fn place(&self, path: &Path) -> TrackResult<PathBuf> {
        let target = self.target_for(path)?;

        if target.exists() {
            if same_file(path, &target) {
                log::debug!("{} is already in place", path.display());
                return Ok(target);
            }
            if self.on_collision == CollisionPolicy::Skip {
                return Err(TrackError::Exists(target));
            }
            log::debug!("Overwriting {}", target.display());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        match self.mode {
            Transfer::Copy => copy_preserving_mtime(path, &target)?,
            Transfer::Move => move_file(path, &target)?,
        }
        log::info!("{} {} -> {}", self.mode.operation(), path.display(), target.display());

        Ok(target)
    }
}

/// Make an artist name safe to use as a single directory name.
#[must_use]
pub fn sanitize_dir_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim().trim_end_matches('.').trim_end();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Copy a file and give the copy the source's modification time.
pub fn copy_preserving_mtime(from: &Path, to: &Path) -> io::Result<()> {
    let modified = fs::metadata(from)?.modified()?;
    fs::copy(from, to)?;
    File::options().write(true).open(to)?.set_modified(modified)?;
    Ok(())
}

/// Move a file, falling back to copy and delete when a rename is not
/// possible (for example across filesystems).
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Err(e) = fs::rename(from, to) {
        log::debug!("rename {} failed ({e}), copying instead", from.display());
        copy_preserving_mtime(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
