//! Artwork catalogs.
//!
//! Artwork is looked up by artist name. The network-backed Discogs client
//! and any test double implement [`ArtworkCatalog`]; [`ArtworkCache`] wraps
//! either so that each artist is looked up at most once per run.

pub mod cache;
pub mod discogs;
pub mod resilience;

use cadenza_core::Artwork;

use crate::error::CatalogResult;

pub use cache::ArtworkCache;
pub use discogs::{DiscogsAuth, DiscogsClient};

/// A source of cover images keyed by artist name.
pub trait ArtworkCatalog {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Look up an image for `artist`.
    ///
    /// `Ok(None)` means the catalog answered but has nothing suitable.
    fn find_artwork(&self, artist: &str) -> CatalogResult<Option<Artwork>>;
}

impl<C: ArtworkCatalog + ?Sized> ArtworkCatalog for &C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn find_artwork(&self, artist: &str) -> CatalogResult<Option<Artwork>> {
        (**self).find_artwork(artist)
    }
}
