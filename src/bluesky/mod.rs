//! # Bluesky Integration Module
//!
//! A minimal XRPC client for posting to Bluesky. It covers exactly what the
//! bot needs:
//!
//! - [`auth`] - `com.atproto.server.createSession` and `refreshSession`
//! - [`post`] - `com.atproto.repo.uploadBlob` and `createRecord` for
//!   `app.bsky.feed.post` records with hashtag facets and an image embed
//!
//! The session itself is owned by [`SessionManager`], which
//! [`BlueskyClient`] holds. When a publish fails the session is marked stale
//! so the next cycle refreshes or re-creates it.
//!
//! All requests go through [`crate::http::send`] and share its timeout and
//! retry policy.

pub mod auth;
pub mod post;

use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

use crate::{
    config::Config,
    cycle::Publisher,
    info,
    management::SessionManager,
    types::{OutgoingPost, PublishReceipt},
};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} rejected the request ({status}): {message}")]
    Rejected {
        endpoint: &'static str,
        status: StatusCode,
        message: String,
    },
    #[error("no Bluesky session available")]
    NoSession,
}

pub fn xrpc_url(service: &str, nsid: &str) -> String {
    format!("{}/xrpc/{}", service.trim_end_matches('/'), nsid)
}

/// Maps a non-success XRPC response to [`PublishError::Rejected`].
pub(crate) async fn check(
    endpoint: &'static str,
    response: Response,
) -> Result<Response, PublishError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(PublishError::Rejected {
        endpoint,
        status,
        message,
    })
}

pub struct BlueskyClient {
    http: Client,
    session: SessionManager,
}

impl BlueskyClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            session: SessionManager::new(http.clone(), config),
            http,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Uploads the image (if any) and creates the post record.
    pub async fn send_post(
        &mut self,
        outgoing: &OutgoingPost,
    ) -> Result<PublishReceipt, PublishError> {
        info!("Posting to Bluesky...");
        let service = self.session.service().to_string();
        let session = self.session.get_valid_session().await?;

        let blob = match &outgoing.image {
            Some(image) => {
                Some(post::upload_blob(&self.http, &service, session, &image.bytes).await?)
            }
            None => None,
        };

        let record = post::build_post_record(
            &outgoing.text,
            blob.map(|b| (b, outgoing.alt.as_str())),
            chrono::Utc::now(),
        );
        post::create_record(&self.http, &service, session, record).await
    }
}

impl Publisher for BlueskyClient {
    async fn publish(&mut self, outgoing: &OutgoingPost) -> Result<PublishReceipt, PublishError> {
        self.send_post(outgoing).await
    }

    fn invalidate_session(&mut self) {
        self.session.invalidate();
    }
}
