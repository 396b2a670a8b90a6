//! Embedding catalog artwork into tracks.

use std::path::{Path, PathBuf};

use cadenza_core::NamingRules;

use crate::catalog::cache::CachedArtwork;
use crate::catalog::{ArtworkCache, ArtworkCatalog};
use crate::error::{TrackError, TrackResult};
use crate::report::{BatchReport, Progress};
use crate::tags::{embed_artwork, read_track};

/// Looks up artwork for each track's lead artist and embeds it as the
/// front cover.
#[derive(Debug)]
pub struct ArtworkEmbedder<'a, C> {
    rules: &'a NamingRules,
    cache: ArtworkCache<C>,
}

impl<'a, C: ArtworkCatalog> ArtworkEmbedder<'a, C> {
    pub fn new(rules: &'a NamingRules, catalog: C) -> Self {
        Self {
            rules,
            cache: ArtworkCache::new(catalog),
        }
    }

    /// Number of lookups that reached the catalog so far.
    pub fn lookups(&self) -> usize {
        self.cache.lookups()
    }

    /// Embed artwork into every file, continuing past failures.
    pub fn embed(&mut self, files: &[PathBuf], progress: &mut dyn Progress) -> BatchReport {
        let mut report = BatchReport::new("art");
        progress.start(report.operation, files.len());

        for (i, path) in files.iter().enumerate() {
            log::debug!("[{}/{}] {}", i + 1, files.len(), path.display());
            match self.embed_one(path) {
                Ok(()) => report.record(path.clone()),
                Err(e) => report.skip(path.clone(), e),
            }
            progress.advance(path);
        }

        progress.finish();
        report
    }

    fn embed_one(&mut self, path: &Path) -> TrackResult<()> {
        let track = read_track(path)?;
        let artist = track.artist().ok_or(TrackError::MissingArtist)?;
        let lead = self.rules.lead_artist(artist);

        match self.cache.get(lead) {
            CachedArtwork::Found(artwork) => {
                embed_artwork(path, &artwork)?;
                log::debug!(
                    "Embedded {} bytes of artwork into {}",
                    artwork.len(),
                    path.display()
                );
                Ok(())
            }
            CachedArtwork::Missing => Err(TrackError::NoArtwork(lead.to_string())),
            CachedArtwork::Failed(message) => Err(TrackError::Lookup {
                artist: lead.to_string(),
                message,
            }),
        }
    }
}
