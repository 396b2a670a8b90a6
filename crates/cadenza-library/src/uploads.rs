//! Finding files modified after a given date.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::scan::{modified_time, Scanner};

/// Accepted threshold formats, tried in order.
const DATE_FORMATS: [&str; 2] = ["%d/%m/%y", "%Y-%m-%d"];

/// A file found by [`recent_uploads`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
}

impl Upload {
    /// The path relative to `root`, or the full path if it is not under it.
    #[must_use]
    pub fn relative_to<'a>(&'a self, root: &Path) -> &'a Path {
        self.path.strip_prefix(root).unwrap_or(&self.path)
    }
}

/// Parse a threshold date (`dd/mm/yy` or `YYYY-MM-DD`) as midnight UTC.
pub fn parse_threshold(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .with_context(|| format!("Invalid date '{input}': expected dd/mm/yy or YYYY-MM-DD"))?;

    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .with_context(|| format!("Invalid date '{input}'"))
}

/// Supported files under `root` modified strictly after `since`, sorted by
/// path.
#[must_use]
pub fn recent_uploads(root: &Path, since: DateTime<Utc>) -> Vec<Upload> {
    Scanner::new(root)
        .files()
        .into_iter()
        .filter_map(|path| match modified_time(&path) {
            Ok(modified) => Some(Upload { path, modified }),
            Err(e) => {
                log::warn!("Cannot read modification time of {}: {e}", path.display());
                None
            }
        })
        .filter(|upload| upload.modified > since)
        .collect()
}
