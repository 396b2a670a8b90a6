//! Discogs artwork catalog.
//!
//! Artwork is resolved in three steps: search for the artist, take the
//! primary image of the first (then second) artist result, and if neither
//! has an image fall back to the cover of the first release credited to
//! that artist.
//!
//! Rate limits are enforced internally: authenticated requests are capped at
//! 4 req/sec (240/min) and unauthenticated requests at 1 req/sec (60/min),
//! matching the Discogs API terms. Every request made here is authenticated.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use cadenza_core::Artwork;

use crate::catalog::resilience::{with_retry, RateLimiter};
use crate::catalog::ArtworkCatalog;
use crate::config::Config;
use crate::error::{CatalogError, CatalogResult};

const DISCOGS_API_BASE: &str = "https://api.discogs.com";
const SOURCE_NAME: &str = "Discogs";
const AUTHENTICATED_RPS: u32 = 4;

/// Number of artist search results whose images are considered.
const ARTIST_CANDIDATES: usize = 2;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Top-level search response wrapper (private).
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DiscogsSearchResult>,
}

/// A single result from the Discogs database search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscogsSearchResult {
    /// Discogs artist or release ID, depending on the search type.
    pub id: u64,
    /// Artist name, or "Artist - Title" for releases.
    #[serde(default)]
    pub title: String,
    /// Full-size cover image URL.
    #[serde(default)]
    pub cover_image: Option<String>,
}

/// Artist details from the Discogs artists endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscogsArtist {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<DiscogsImage>,
}

/// An image attached to an artist or release.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscogsImage {
    /// "primary" or "secondary".
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub uri: String,
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Credentials for the Discogs API.
#[derive(Clone, PartialEq, Eq)]
pub enum DiscogsAuth {
    /// A personal access token.
    Token(String),
    /// An application consumer key and secret.
    Consumer { key: String, secret: String },
}

impl DiscogsAuth {
    /// Read credentials from the configuration. A token wins over a
    /// consumer key pair.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingCredentials`] when neither a token nor
    /// a complete key/secret pair is configured.
    pub fn from_config(config: &Config) -> CatalogResult<Self> {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        if let Some(token) = non_blank(&config.discogs_token) {
            return Ok(Self::Token(token));
        }

        match (
            non_blank(&config.discogs_consumer_key),
            non_blank(&config.discogs_consumer_secret),
        ) {
            (Some(key), Some(secret)) => Ok(Self::Consumer { key, secret }),
            _ => Err(CatalogError::MissingCredentials {
                source_name: SOURCE_NAME.to_string(),
                hint: "set discogs_token (or discogs_consumer_key and discogs_consumer_secret) \
                       in the config file, or CADENZA_DISCOGS_TOKEN in the environment"
                    .to_string(),
            }),
        }
    }

    /// The `Authorization` header value.
    fn header(&self) -> String {
        match self {
            Self::Token(token) => format!("Discogs token={token}"),
            Self::Consumer { key, secret } => format!("Discogs key={key}, secret={secret}"),
        }
    }
}

impl fmt::Debug for DiscogsAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("DiscogsAuth::Token(****)"),
            Self::Consumer { .. } => f.write_str("DiscogsAuth::Consumer(****)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Discogs API client.
///
/// Wraps a blocking [`reqwest`] client pre-configured with the user-agent
/// header and a 30-second timeout.
#[derive(Debug)]
pub struct DiscogsClient {
    http: Client,
    auth: DiscogsAuth,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl DiscogsClient {
    /// Create a new Discogs client.
    pub fn new(auth: DiscogsAuth, user_agent: &str) -> CatalogResult<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self::with_client(http, auth))
    }

    fn with_client(http: Client, auth: DiscogsAuth) -> Self {
        Self {
            http,
            auth,
            base_url: DISCOGS_API_BASE.to_string(),
            rate_limiter: RateLimiter::new(AUTHENTICATED_RPS),
        }
    }

    /// Build a client from the configured credentials and user agent.
    pub fn from_config(config: &Config) -> CatalogResult<Self> {
        Self::new(DiscogsAuth::from_config(config)?, &config.user_agent)
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search for artists by name.
    pub fn search_artists(&self, artist: &str) -> CatalogResult<Vec<DiscogsSearchResult>> {
        let url = format!("{}/database/search", self.base_url);
        let result: SearchResponse = self.get_json(&url, &[("q", artist), ("type", "artist")])?;
        Ok(result.results)
    }

    /// Search for releases credited to an artist.
    pub fn search_releases(&self, artist: &str) -> CatalogResult<Vec<DiscogsSearchResult>> {
        let url = format!("{}/database/search", self.base_url);
        let result: SearchResponse =
            self.get_json(&url, &[("artist", artist), ("type", "release")])?;
        Ok(result.results)
    }

    /// Get artist details by Discogs artist ID.
    pub fn get_artist(&self, id: u64) -> CatalogResult<DiscogsArtist> {
        let url = format!("{}/artists/{id}", self.base_url);
        self.get_json(&url, &[])
    }

    /// Find the URL of the best image for an artist.
    ///
    /// A candidate that cannot be fetched is passed over. Transient failures
    /// that outlast the retries still end the lookup.
    pub fn find_image_url(&self, artist: &str) -> CatalogResult<Option<String>> {
        let candidates = self.search_artists(artist)?;

        for candidate in candidates.iter().take(ARTIST_CANDIDATES) {
            let details = match self.get_artist(candidate.id) {
                Ok(details) => details,
                Err(e) if e.is_transient() => return Err(e),
                Err(e) => {
                    log::warn!(
                        "Skipping Discogs artist {} ({}): {e}",
                        candidate.title,
                        candidate.id
                    );
                    continue;
                }
            };
            if let Some(uri) = pick_artist_image(&details.images) {
                log::debug!(
                    "Using image of Discogs artist {} ({})",
                    details.name,
                    details.id
                );
                return Ok(Some(uri.to_string()));
            }
        }

        log::debug!("No artist image for \"{artist}\", trying releases");
        let releases = self.search_releases(artist)?;
        Ok(releases
            .into_iter()
            .next()
            .and_then(|release| release.cover_image)
            .filter(|uri| is_usable_image(uri)))
    }

    /// Download an image.
    pub fn download(&self, url: &str) -> CatalogResult<Artwork> {
        let response = self.send(url, &[])?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let data = response.bytes()?.to_vec();

        Ok(Artwork::new(
            data,
            content_type.as_deref(),
            Some(url.to_string()),
        ))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> CatalogResult<T> {
        let response = self.send(url, query)?;
        response.json().map_err(|e| CatalogError::Parse {
            source_name: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })
    }

    fn send(&self, url: &str, query: &[(&str, &str)]) -> CatalogResult<Response> {
        with_retry(url, || {
            self.rate_limiter.acquire();
            let response = self
                .http
                .get(url)
                .query(query)
                .header(AUTHORIZATION, self.auth.header())
                .send()?;
            check_status(response)
        })
    }
}

impl ArtworkCatalog for DiscogsClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn find_artwork(&self, artist: &str) -> CatalogResult<Option<Artwork>> {
        match self.find_image_url(artist)? {
            Some(url) => self.download(&url).map(Some),
            None => Ok(None),
        }
    }
}

fn check_status(response: Response) -> CatalogResult<Response> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(CatalogError::RateLimited {
            source_name: SOURCE_NAME.to_string(),
        });
    }

    response.error_for_status().map_err(|e| CatalogError::Http {
        source_name: SOURCE_NAME.to_string(),
        status: Some(status.as_u16()),
        message: e.to_string(),
    })
}

/// The primary image if there is one, else the first image.
fn pick_artist_image(images: &[DiscogsImage]) -> Option<&str> {
    images
        .iter()
        .find(|image| image.kind == "primary" && is_usable_image(&image.uri))
        .or_else(|| images.iter().find(|image| is_usable_image(&image.uri)))
        .map(|image| image.uri.as_str())
}

/// Discogs serves a transparent placeholder for releases without artwork.
fn is_usable_image(uri: &str) -> bool {
    !uri.trim().is_empty() && !uri.ends_with("spacer.gif")
}
