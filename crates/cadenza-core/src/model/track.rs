use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::model::artwork::Artwork;

/// A music file on disk together with the tags read from it.
///
/// Tracks are transient: they live for the duration of one command and
/// are rebuilt from the file whenever they are needed again.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Path to the audio file.
    pub path: PathBuf,

    /// Artist as read from the ID3 tag.
    pub artist: Option<String>,

    /// Title as read from the ID3 tag.
    pub title: Option<String>,

    /// Embedded front cover, if any.
    pub artwork: Option<Artwork>,

    /// File modification time.
    pub modified: DateTime<Utc>,
}

impl Track {
    #[must_use]
    pub fn new(path: PathBuf, modified: DateTime<Utc>) -> Self {
        Self {
            path,
            artist: None,
            title: None,
            artwork: None,
            modified,
        }
    }

    /// Whether the path names a file whose tags cadenza can rewrite.
    ///
    /// Only MP3 files carry the ID3 tags this tool works with.
    #[must_use]
    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("mp3"))
    }

    /// The file name component of the track's path.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    /// The artist tag, ignoring blank values.
    #[must_use]
    pub fn artist(&self) -> Option<&str> {
        self.artist
            .as_deref()
            .map(str::trim)
            .filter(|artist| !artist.is_empty())
    }
}
