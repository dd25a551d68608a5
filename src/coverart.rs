//! Cover Art Archive lookups.
//!
//! Release art is addressed by the MusicBrainz release id. The archive
//! redirects to the image host, which the client follows.

use reqwest::{Client, StatusCode};

use crate::{
    config::Config,
    cycle::ArtSource,
    http::{self, FetchError},
    info, warning,
};

/// Cover Art Archive client. Front covers are fetched at the 500px size.
pub struct CoverArtClient {
    http: Client,
    api_url: String,
}

impl CoverArtClient {
    /// Creates a client for the archive at `COVERART_API_URL`.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared client carrying the request timeout and user agent
    /// * `config` - Supplies the archive base URL
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            api_url: config.coverart_api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Downloads the front cover for a release.
    ///
    /// # Arguments
    ///
    /// * `release_mbid` - MusicBrainz release id taken from the listen
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` - the raw image, in whatever format the archive
    ///   stores it
    /// - `Ok(None)` - the release has no front cover (404)
    ///
    /// # Errors
    ///
    /// - [`FetchError::Status`] for any other non-200 status
    /// - [`FetchError::Http`] for network failures or a truncated body
    ///
    /// # Example
    ///
    /// ```
    /// let client = CoverArtClient::new(http::client(timeout)?, &config);
    /// match client.front_cover("76df3287-6cda-33eb-8e9a-044b5e15ffdd").await? {
    ///     Some(bytes) => println!("{} bytes of art", bytes.len()),
    ///     None => println!("no cover"),
    /// }
    /// ```
    pub async fn front_cover(&self, release_mbid: &str) -> Result<Option<Vec<u8>>, FetchError> {
        let url = format!(
            "{api}/release/{mbid}/front-500",
            api = self.api_url,
            mbid = release_mbid
        );

        let response = http::send(self.http.get(&url)).await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.bytes().await?.to_vec())),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(FetchError::Status {
                service: "Cover Art Archive",
                status,
            }),
        }
    }
}

impl ArtSource for CoverArtClient {
    async fn cover_art(&self, release_mbid: &str) -> Result<Option<Vec<u8>>, FetchError> {
        let art = self.front_cover(release_mbid).await?;
        match &art {
            Some(bytes) => info!("Album art found ({} bytes).", bytes.len()),
            None => warning!("No album art available."),
        }
        Ok(art)
    }
}
