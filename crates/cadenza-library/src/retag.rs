//! Rewriting artist and title tags from file names.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use cadenza_core::{NameError, NamingRules};

use crate::error::{TrackError, TrackResult};
use crate::organize::move_file;
use crate::report::{BatchReport, Progress, SkippedTrack};
use crate::scan::QUARANTINE_DIR;
use crate::tags::write_names;

/// What happened to one file.
#[derive(Debug, PartialEq, Eq)]
enum Retagged {
    Tagged { path: PathBuf, renamed: bool },
    Quarantined,
}

/// Tags files from their `Artist - Title.mp3` names.
#[derive(Debug)]
pub struct Retagger<'a> {
    rules: &'a NamingRules,
    quarantine: Option<PathBuf>,
}

impl<'a> Retagger<'a> {
    #[must_use]
    pub fn new(rules: &'a NamingRules) -> Self {
        Self {
            rules,
            quarantine: None,
        }
    }

    /// Move unparseable files into `<source>/_invalid`.
    #[must_use]
    pub fn quarantine_into(mut self, source: &Path) -> Self {
        self.quarantine = Some(source.join(QUARANTINE_DIR));
        self
    }

    /// Retag every file, continuing past failures. Files that were
    /// renamed during normalization are reported at their new paths,
    /// including when tagging fails after the rename.
    pub fn retag(&self, files: &[PathBuf], progress: &mut dyn Progress) -> BatchReport {
        let mut report = BatchReport::new("id3");
        progress.start(report.operation, files.len());

        for (i, path) in files.iter().enumerate() {
            log::debug!("[{}/{}] {}", i + 1, files.len(), path.display());
            match self.retag_one(path) {
                Ok(Retagged::Tagged { path, renamed }) => {
                    if renamed {
                        report.renamed += 1;
                    }
                    report.record(path);
                }
                Ok(Retagged::Quarantined) => report.quarantined += 1,
                Err(SkippedTrack { path, reason }) => report.skip(path, reason),
            }
            progress.advance(path);
        }

        progress.finish();
        report
    }

    fn retag_one(&self, path: &Path) -> Result<Retagged, SkippedTrack> {
        let skipped = |path: &Path, reason: TrackError| SkippedTrack {
            path: path.to_path_buf(),
            reason,
        };

        let file_name = path
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| skipped(path, NameError::NotUnicode.into()))?;

        let parsed = match self.rules.parse(file_name) {
            Ok(parsed) => parsed,
            Err(e) => return self.reject(path, e).map_err(|e| skipped(path, e)),
        };

        let renamed = parsed.file_name != file_name;
        let current = if renamed {
            match rename_within_dir(path, &parsed.file_name) {
                Ok(target) => target,
                Err(e) => return Err(skipped(path, e)),
            }
        } else {
            path.to_path_buf()
        };

        if let Err(e) = write_names(&current, &parsed.artist, &parsed.title) {
            return Err(skipped(&current, e));
        }
        log::debug!(
            "Tagged {}: artist \"{}\", title \"{}\"",
            current.display(),
            parsed.artist,
            parsed.title
        );

        Ok(Retagged::Tagged {
            path: current,
            renamed,
        })
    }

    /// Quarantine an unparseable file if configured, otherwise skip it.
    fn reject(&self, path: &Path, reason: NameError) -> TrackResult<Retagged> {
        let Some(dir) = &self.quarantine else {
            return Err(reason.into());
        };
        let Some(file_name) = path.file_name() else {
            return Err(reason.into());
        };

        let target = dir.join(file_name);
        if target.exists() {
            log::warn!(
                "{} is already quarantined, leaving {} in place",
                target.display(),
                path.display()
            );
            return Err(reason.into());
        }

        fs::create_dir_all(dir)?;
        move_file(path, &target)?;
        log::warn!("Quarantined {} ({reason})", path.display());
        Ok(Retagged::Quarantined)
    }
}

/// Rename `path` to `file_name` in the same directory, refusing to
/// replace an existing file.
fn rename_within_dir(path: &Path, file_name: &str) -> TrackResult<PathBuf> {
    let target = path.with_file_name(file_name);
    if target.exists() {
        return Err(TrackError::Exists(target));
    }
    fs::rename(path, &target)?;
    log::info!("Renamed {} -> {}", path.display(), target.display());
    Ok(target)
}
