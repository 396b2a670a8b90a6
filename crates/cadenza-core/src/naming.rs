//! Filename conventions.
//!
//! Files are expected to be named `Artist - Title.mp3`. Before a name is
//! parsed it is normalized: "featuring" markers in their many spellings
//! (`feat.`, `featuring`, `Ft`) collapse to a single `ft.` form so that
//! the resulting tags, and the file name itself, are consistent across a
//! library.
//!
//! All patterns are user-configurable regular expressions, matched
//! case-insensitively.

use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::error::{Error, Result};

/// Separator between the artist and the title in a file name.
pub const NAME_DELIMITER: &str = " - ";

const FEATURE_REPLACEMENT: &str = " ft. ";
const FEATURE_PAREN_REPLACEMENT: &str = "(ft. ";

/// The raw regular expressions, as stored in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingPatterns {
    /// Splits collaborating artists ("A & B", "A and B", "A, B").
    pub and_pattern: String,
    /// A bare featuring marker between two names ("A feat. B").
    pub feature_pattern: String,
    /// A parenthesised featuring marker ("Title (featuring B)").
    pub feature_paren_pattern: String,
    /// Names matching this are never tagged.
    pub invalid_pattern: String,
}

impl Default for NamingPatterns {
    fn default() -> Self {
        Self {
            and_pattern: r"\s+(?:&|and|x|vs\.?)\s+|\s*,\s*".to_string(),
            feature_pattern: r"\s+(?:feat\.?|featuring|ft\.?)\s+".to_string(),
            feature_paren_pattern: r"\(\s*(?:feat\.?|featuring|ft\.?)\s+".to_string(),
            invalid_pattern:
                r"\b(?:official\s+(?:music\s+)?video|lyrics?\s+video|official\s+audio)\b"
                    .to_string(),
        }
    }
}

/// Why a file name could not be turned into an artist and a title.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("no \" - \" separator between artist and title")]
    MissingDelimiter,

    #[error("expected one \" - \" separator, found {0}")]
    AmbiguousDelimiter(usize),

    #[error("artist part is empty")]
    EmptyArtist,

    #[error("title part is empty")]
    EmptyTitle,

    #[error("name is flagged as invalid (matched \"{0}\")")]
    Flagged(String),

    #[error("file name is not valid UTF-8")]
    NotUnicode,
}

/// A successfully parsed file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// The normalized file name, extension included.
    pub file_name: String,
    pub artist: String,
    pub title: String,
}

/// Compiled naming patterns.
#[derive(Debug, Clone)]
pub struct NamingRules {
    and_split: Regex,
    feature: Regex,
    feature_paren: Regex,
    invalid: Regex,
}

impl NamingRules {
    /// Compile the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] naming the first pattern that fails to
    /// compile.
    pub fn new(patterns: &NamingPatterns) -> Result<Self> {
        Ok(Self {
            and_split: compile("and_pattern", &patterns.and_pattern)?,
            feature: compile("feature_pattern", &patterns.feature_pattern)?,
            feature_paren: compile("feature_paren_pattern", &patterns.feature_paren_pattern)?,
            invalid: compile("invalid_pattern", &patterns.invalid_pattern)?,
        })
    }

    /// Rewrite featuring markers into the canonical `ft.` form.
    ///
    /// Normalizing an already normalized name returns it unchanged.
    #[must_use]
    pub fn normalize(&self, file_name: &str) -> String {
        let name = self
            .feature
            .replace_all(file_name, NoExpand(FEATURE_REPLACEMENT));
        self.feature_paren
            .replace_all(&name, NoExpand(FEATURE_PAREN_REPLACEMENT))
            .into_owned()
    }

    /// Normalize a file name and split it into artist and title.
    pub fn parse(&self, file_name: &str) -> std::result::Result<ParsedName, NameError> {
        let normalized = self.normalize(file_name);

        if let Some(found) = self.invalid.find(&normalized) {
            return Err(NameError::Flagged(found.as_str().to_string()));
        }

        let stem = Path::new(&normalized)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or(NameError::NotUnicode)?;

        let segments: Vec<&str> = stem.split(NAME_DELIMITER).collect();
        let (artist, title) = match segments.as_slice() {
            [_] => return Err(NameError::MissingDelimiter),
            [artist, title] => (artist.trim(), title.trim()),
            more => return Err(NameError::AmbiguousDelimiter(more.len() - 1)),
        };

        if artist.is_empty() {
            return Err(NameError::EmptyArtist);
        }
        if title.is_empty() {
            return Err(NameError::EmptyTitle);
        }

        Ok(ParsedName {
            artist: artist.to_string(),
            title: title.to_string(),
            file_name: normalized,
        })
    }

    /// The first credited artist, used to key catalog lookups.
    ///
    /// Collaborators ("A & B") and featured artists ("A ft. B") are cut
    /// off. Falls back to the whole trimmed tag if the cut leaves nothing.
    #[must_use]
    pub fn lead_artist<'a>(&self, artist: &'a str) -> &'a str {
        let whole = artist.trim();
        let before_and = self.and_split.split(whole).next().unwrap_or(whole).trim();
        let lead = self
            .feature
            .split(before_and)
            .next()
            .unwrap_or(before_and)
            .trim();

        if lead.is_empty() {
            whole
        } else {
            lead
        }
    }
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::Pattern { name, source })
}
