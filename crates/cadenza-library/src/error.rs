//! Error types for catalog lookups and per-file library operations.

use std::path::PathBuf;

use thiserror::Error;

use cadenza_core::NameError;

/// Errors that can occur while talking to the artwork catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An HTTP request to the catalog failed with an error status.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        status: Option<u16>,
        message: String,
    },

    /// The catalog returned a rate-limit response.
    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// A response from the catalog could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// No usable credentials were configured.
    #[error("missing {source_name} credentials: {hint}")]
    MissingCredentials {
        source_name: String,
        hint: String,
    },
}

impl CatalogError {
    /// Returns `true` when the error is transient and the operation may
    /// succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Http { status, .. } => status.map_or(true, |code| code >= 500),
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::Parse { .. } | Self::MissingCredentials { .. } => false,
        }
    }
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Why a single file was skipped. None of these abort a batch.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The file name does not follow the `Artist - Title.mp3` convention.
    #[error("cannot parse file name: {0}")]
    Name(#[from] NameError),

    /// Tags could not be read or written.
    #[error("tag error: {0}")]
    Tag(#[from] lofty::error::LoftyError),

    /// The file has no artist tag to sort or look up by.
    #[error("no artist tag")]
    MissingArtist,

    /// The catalog has no artwork for the track's artist.
    #[error("no artwork found for \"{0}\"")]
    NoArtwork(String),

    /// A catalog lookup for the track's artist failed.
    #[error("artwork lookup for \"{artist}\" failed: {message}")]
    Lookup { artist: String, message: String },

    /// The target already exists and the collision policy says skip.
    #[error("{} already exists", .0.display())]
    Exists(PathBuf),

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for per-file results.
pub type TrackResult<T> = std::result::Result<T, TrackError>;
