//! Library operations for cadenza.
//!
//! Implements tag rewriting, artwork lookup and embedding, library
//! organization and upload discovery on top of the `cadenza-core` model.
//! Every batch operation takes a list of files and returns a
//! [`BatchReport`]; per-file failures never abort a batch.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod artwork;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logfile;
pub mod organize;
pub mod pipeline;
pub mod report;
pub mod retag;
pub mod scan;
pub mod tags;
pub mod uploads;

pub use artwork::ArtworkEmbedder;
pub use catalog::{ArtworkCache, ArtworkCatalog, DiscogsAuth, DiscogsClient};
pub use config::{CollisionPolicy, Config, SettingsFile};
pub use error::{CatalogError, CatalogResult, TrackError, TrackResult};
pub use logfile::LogFileInfo;
pub use organize::{Organizer, Transfer};
pub use pipeline::run_all;
pub use report::{BatchReport, NoProgress, Progress, SkippedTrack};
pub use retag::Retagger;
pub use scan::Scanner;
pub use uploads::{parse_threshold, recent_uploads, Upload};
