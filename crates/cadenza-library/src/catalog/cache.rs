use std::collections::HashMap;
use std::rc::Rc;

use cadenza_core::Artwork;

use crate::catalog::ArtworkCatalog;

/// The remembered outcome of one lookup.
#[derive(Debug, Clone)]
pub enum CachedArtwork {
    Found(Rc<Artwork>),
    Missing,
    Failed(String),
}

/// Memoizes catalog lookups for the lifetime of one run.
///
/// Keys are lead-artist names compared case-insensitively. Misses and
/// failures are cached as well, so every track by the same artist gets the
/// same outcome and the same bytes.
#[derive(Debug)]
pub struct ArtworkCache<C> {
    catalog: C,
    entries: HashMap<String, CachedArtwork>,
    lookups: usize,
}

impl<C: ArtworkCatalog> ArtworkCache<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            entries: HashMap::new(),
            lookups: 0,
        }
    }

    /// Artwork for `artist`, asking the catalog only on first use.
    pub fn get(&mut self, artist: &str) -> CachedArtwork {
        let key = artist.trim().to_lowercase();
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("Artwork cache hit for \"{artist}\"");
            return hit.clone();
        }

        self.lookups += 1;
        log::debug!("Looking up artwork for \"{artist}\" in {}", self.catalog.name());
        let outcome = match self.catalog.find_artwork(artist.trim()) {
            Ok(Some(artwork)) => CachedArtwork::Found(Rc::new(artwork)),
            Ok(None) => CachedArtwork::Missing,
            Err(e) => CachedArtwork::Failed(e.to_string()),
        };

        self.entries.insert(key, outcome.clone());
        outcome
    }

    /// Number of lookups that reached the catalog.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CatalogError, CatalogResult};
    use std::cell::Cell;

    struct CountingCatalog {
        calls: Cell<usize>,
    }

    impl ArtworkCatalog for CountingCatalog {
        fn name(&self) -> &str {
            "counting"
        }

        fn find_artwork(&self, artist: &str) -> CatalogResult<Option<Artwork>> {
            self.calls.set(self.calls.get() + 1);
            match artist {
                "Nobody" => Ok(None),
                "Broken" => Err(CatalogError::Parse {
                    source_name: "counting".to_string(),
                    message: "garbage".to_string(),
                }),
                _ => Ok(Some(Artwork::new(
                    artist.as_bytes().to_vec(),
                    Some("image/jpeg"),
                    None,
                ))),
            }
        }
    }

    fn catalog() -> CountingCatalog {
        CountingCatalog {
            calls: Cell::new(0),
        }
    }

    #[test]
    fn test_cache_hit_is_case_insensitive() {
        let catalog = catalog();
        let mut cache = ArtworkCache::new(&catalog);

        let first = cache.get("Nina Simone");
        let second = cache.get("nina simone ");

        assert_eq!(catalog.calls.get(), 1);
        assert_eq!(cache.lookups(), 1);
        match (first, second) {
            (CachedArtwork::Found(a), CachedArtwork::Found(b)) => {
                assert!(Rc::ptr_eq(&a, &b));
                assert_eq!(a.data, b"Nina Simone");
            }
            other => panic!("expected artwork, got {other:?}"),
        }
    }

    #[test]
    fn test_cache_remembers_misses_and_failures() {
        let catalog = catalog();
        let mut cache = ArtworkCache::new(&catalog);

        assert!(matches!(cache.get("Nobody"), CachedArtwork::Missing));
        assert!(matches!(cache.get("Nobody"), CachedArtwork::Missing));
        assert!(matches!(cache.get("Broken"), CachedArtwork::Failed(_)));
        assert!(matches!(cache.get("Broken"), CachedArtwork::Failed(_)));

        assert_eq!(catalog.calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }
}
