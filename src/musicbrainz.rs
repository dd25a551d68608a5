//! MusicBrainz artist tag lookups.
//!
//! Genres come from the community tags on the best matching artist of an
//! artist search. MusicBrainz rejects anonymous clients without a user
//! agent, which the shared client sets.

use reqwest::{Client, StatusCode};

use crate::{
    config::{Config, MAX_GENRES},
    cycle::GenreSource,
    http::{self, FetchError},
    types::ArtistSearchResponse,
};

/// Client for the MusicBrainz web service (`/ws/2`).
pub struct MusicBrainzClient {
    http: Client,
    api_url: String,
}

impl MusicBrainzClient {
    /// # Arguments
    ///
    /// * `http` - Shared client carrying the request timeout and user agent
    /// * `config` - Supplies the web service base URL
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            api_url: config.musicbrainz_api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Looks up the community tags of an artist by name.
    ///
    /// Runs a Lucene search `artist:"<name>"` limited to one result and
    /// keeps the most voted tags of that artist.
    ///
    /// # Arguments
    ///
    /// * `artist` - Artist name as reported by ListenBrainz. Double quotes
    ///   are removed so the name cannot end the quoted search term.
    ///
    /// # Returns
    ///
    /// Up to [`MAX_GENRES`] tag names, most voted first. An empty list when
    /// no artist matched or the artist has no tags.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Status`] for a non-200 status, e.g. 503 when the
    ///   service throttles the client
    /// - [`FetchError::Http`] for network failures or malformed JSON
    ///
    /// # Example
    ///
    /// ```
    /// let client = MusicBrainzClient::new(http::client(timeout)?, &config);
    /// let tags = client.artist_tags("Boards of Canada").await?;
    /// // e.g. ["electronic", "idm", "ambient"]
    /// ```
    pub async fn artist_tags(&self, artist: &str) -> Result<Vec<String>, FetchError> {
        let url = format!("{api}/ws/2/artist/", api = self.api_url);
        let query = format!("artist:\"{}\"", artist.replace('"', ""));

        let request = self
            .http
            .get(&url)
            .query(&[("query", query.as_str()), ("fmt", "json"), ("limit", "1")]);
        let response = http::send(request).await?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                service: "MusicBrainz",
                status: response.status(),
            });
        }

        let body = response.json::<ArtistSearchResponse>().await?;
        Ok(top_tags(body, MAX_GENRES))
    }
}

/// Tags of the first artist, most voted first, at most `limit` of them.
pub fn top_tags(response: ArtistSearchResponse, limit: usize) -> Vec<String> {
    let Some(artist) = response.artists.into_iter().next() else {
        return Vec::new();
    };

    let mut tags = artist.tags;
    // stable sort keeps MusicBrainz order for equal counts
    tags.sort_by(|a, b| b.count.cmp(&a.count));
    tags.into_iter()
        .map(|t| t.name)
        .filter(|name| !name.trim().is_empty())
        .take(limit)
        .collect()
}

impl GenreSource for MusicBrainzClient {
    async fn genres(&self, artist: &str) -> Result<Vec<String>, FetchError> {
        self.artist_tags(artist).await
    }
}
