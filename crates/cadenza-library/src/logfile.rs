//! Debug log file maintenance.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// What `log_info` reports about the debug log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileInfo {
    pub name: String,
    pub directory: PathBuf,
    /// Records written to the file carry timestamps.
    pub timestamps: bool,
    pub enabled: bool,
    /// Current size in bytes, or `None` if the file does not exist.
    pub size: Option<u64>,
}

impl LogFileInfo {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let path = &config.log_file;
        Self {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            timestamps: true,
            enabled: config.debug_log,
            size: fs::metadata(path).ok().map(|meta| meta.len()),
        }
    }
}

/// Delete the debug log. Returns false if there was nothing to delete.
pub fn clear(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
