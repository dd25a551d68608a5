//! ListenBrainz now-playing lookups.
//!
//! Uses `GET /1/user/{user}/playing-now` with the user's API token. The
//! endpoint returns at most one listen; an empty `listens` array means
//! nothing is playing.

use reqwest::{Client, StatusCode};

use crate::{
    config::Config,
    cycle::NowPlayingSource,
    http::{self, FetchError},
    info,
    types::{NowPlayingRecord, PlayingNowResponse},
    utils,
};

/// Client for the ListenBrainz API, bound to a single user.
///
/// The user token is sent with every request as `Authorization: Token ...`,
/// which also lifts the anonymous rate limit.
pub struct ListenBrainzClient {
    http: Client,
    api_url: String,
    user: String,
    token: String,
}

impl ListenBrainzClient {
    /// Creates a client for the user configured in `LB_USERNAME`.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared client carrying the request timeout and user agent
    /// * `config` - Supplies the API URL, user name and token
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            api_url: config.listenbrainz_api_url.trim_end_matches('/').to_string(),
            user: config.listenbrainz_user.clone(),
            token: config.listenbrainz_token.clone(),
        }
    }

    /// Fetches the track currently playing for the configured user.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` - a track with both artist and title
    /// - `Ok(None)` - nothing playing, or the listen lacks artist/title
    /// - `Err(FetchError)` - network failure or a non-200 response
    ///
    /// # Errors
    ///
    /// - [`FetchError::Status`] for any status other than 200, including an
    ///   invalid token (401) or an unknown user (404)
    /// - [`FetchError::Http`] when every attempt failed or the body is not
    ///   the expected JSON
    ///
    /// Transient failures are retried by [`http::send`] first.
    ///
    /// # Example
    ///
    /// ```
    /// let client = ListenBrainzClient::new(http::client(timeout)?, &config);
    /// if let Some(track) = client.playing_now().await? {
    ///     println!("{} - {}", track.artist, track.title);
    /// }
    /// ```
    pub async fn playing_now(&self) -> Result<Option<NowPlayingRecord>, FetchError> {
        let url = format!(
            "{api}/1/user/{user}/playing-now",
            api = self.api_url,
            user = self.user
        );

        let request = self
            .http
            .get(&url)
            .header("Authorization", format!("Token {}", self.token));
        let response = http::send(request).await?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                service: "ListenBrainz",
                status: response.status(),
            });
        }

        let body = response.json::<PlayingNowResponse>().await?;
        Ok(parse_playing_now(body))
    }
}

/// Turns a `playing-now` response into a record.
///
/// Artist and title are required; anything else is optional. Tags are kept
/// in the order ListenBrainz sent them.
pub fn parse_playing_now(response: PlayingNowResponse) -> Option<NowPlayingRecord> {
    let listen = response.payload.listens.into_iter().next()?;
    let track = listen.track_metadata;

    let artist = utils::non_empty(track.artist_name)?;
    let title = utils::non_empty(track.track_name)?;

    Some(NowPlayingRecord {
        artist,
        title,
        release: utils::non_empty(track.release_name),
        release_mbid: utils::non_empty(track.additional_info.release_mbid),
        release_year: utils::release_year(track.release_year.as_ref()),
        tags: track
            .tags
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect(),
    })
}

impl NowPlayingSource for ListenBrainzClient {
    async fn now_playing(&self) -> Result<Option<NowPlayingRecord>, FetchError> {
        info!("Checking ListenBrainz...");
        self.playing_now().await
    }
}
