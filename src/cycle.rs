//! A single check: fetch what is playing, skip silence and duplicates,
//! enrich, assemble, publish, record.
//!
//! The collaborators sit behind small traits so the cycle can run against
//! the real services or against fakes. Each one reports a typed error and
//! the cycle decides per kind whether to skip, degrade or abort:
//!
//! - now-playing [`FetchError`]: skip the cycle
//! - genre or art [`FetchError`], [`ImageError`]: post without them
//! - [`PublishError`]: abort without recording, mark the session stale
//! - [`LedgerError`]: abort, never swallowed
//!
//! [`ImageError`]: crate::post::ImageError

use thiserror::Error;

use crate::{
    bluesky::{BlueskyClient, PublishError},
    config::{Config, ImageLimits, MAX_GENRES},
    coverart::CoverArtClient,
    http::{self, FetchError},
    info,
    listenbrainz::ListenBrainzClient,
    management::{LedgerError, PostLedger},
    musicbrainz::MusicBrainzClient,
    post, success,
    types::{NormalizedImage, NowPlayingRecord, OutgoingPost, PublishReceipt},
    warning,
};

#[allow(async_fn_in_trait)]
pub trait NowPlayingSource {
    async fn now_playing(&self) -> Result<Option<NowPlayingRecord>, FetchError>;
}

#[allow(async_fn_in_trait)]
pub trait ArtSource {
    /// Raw image bytes for a release, `None` when it has no art.
    async fn cover_art(&self, release_mbid: &str) -> Result<Option<Vec<u8>>, FetchError>;
}

#[allow(async_fn_in_trait)]
pub trait GenreSource {
    async fn genres(&self, artist: &str) -> Result<Vec<String>, FetchError>;
}

#[allow(async_fn_in_trait)]
pub trait Publisher {
    async fn publish(&mut self, post: &OutgoingPost) -> Result<PublishReceipt, PublishError>;

    /// Forces the next publish to refresh or re-create its session.
    fn invalidate_session(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NothingPlaying,
    SourceUnavailable,
    AlreadyPosted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Skipped(SkipReason),
    Posted {
        receipt: PublishReceipt,
        with_image: bool,
    },
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
    #[error("ledger failed: {0}")]
    Ledger(#[from] LedgerError),
}

pub struct CheckCycle<N, A, G, P> {
    now_playing: N,
    art: A,
    genres: G,
    publisher: P,
    ledger: PostLedger,
    limits: ImageLimits,
}

pub type LiveCheckCycle =
    CheckCycle<ListenBrainzClient, CoverArtClient, MusicBrainzClient, BlueskyClient>;

impl LiveCheckCycle {
    /// Wires the real services together. All of them share one HTTP client.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = http::client(config.request_timeout)?;
        Ok(CheckCycle::new(
            ListenBrainzClient::new(client.clone(), config),
            CoverArtClient::new(client.clone(), config),
            MusicBrainzClient::new(client.clone(), config),
            BlueskyClient::new(client, config),
            PostLedger::new(config.ledger_path.clone()),
            config.image,
        ))
    }
}

impl<N, A, G, P> CheckCycle<N, A, G, P>
where
    N: NowPlayingSource,
    A: ArtSource,
    G: GenreSource,
    P: Publisher,
{
    pub fn new(
        now_playing: N,
        art: A,
        genres: G,
        publisher: P,
        ledger: PostLedger,
        limits: ImageLimits,
    ) -> Self {
        Self {
            now_playing,
            art,
            genres,
            publisher,
            ledger,
            limits,
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn ledger(&self) -> &PostLedger {
        &self.ledger
    }

    pub async fn run(&mut self) -> Result<CycleOutcome, CycleError> {
        let track = match self.now_playing.now_playing().await {
            Ok(Some(track)) if !track.artist.is_empty() && !track.title.is_empty() => track,
            Ok(_) => {
                info!("Nothing playing.");
                return Ok(CycleOutcome::Skipped(SkipReason::NothingPlaying));
            }
            Err(e) => {
                warning!("Now-playing lookup failed: {}", e);
                return Ok(CycleOutcome::Skipped(SkipReason::SourceUnavailable));
            }
        };
        info!("Now playing: {} - {}", track.artist, track.title);

        if self
            .ledger
            .was_posted_today(&track.artist, &track.title)
            .await?
        {
            info!("Already posted today.");
            return Ok(CycleOutcome::Skipped(SkipReason::AlreadyPosted));
        }

        let genres = self.genres_for(&track).await;
        let Some(assembled) = post::assemble(&track, &genres) else {
            return Ok(CycleOutcome::Skipped(SkipReason::NothingPlaying));
        };

        let image = self.cover_image(&track).await;
        let with_image = image.is_some();
        let outgoing = OutgoingPost {
            text: post::build_facets(&assembled.caption, &assembled.hashtags),
            image,
            alt: post::track_line(&track),
        };

        let receipt = match self.publisher.publish(&outgoing).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.publisher.invalidate_session();
                return Err(CycleError::Publish(e));
            }
        };
        success!("Post published: {}", receipt.uri);

        self.ledger.record(&track.artist, &track.title).await?;

        Ok(CycleOutcome::Posted {
            receipt,
            with_image,
        })
    }

    /// Tags carried by the listen win; otherwise ask the genre source.
    async fn genres_for(&self, track: &NowPlayingRecord) -> Vec<String> {
        if !track.tags.is_empty() {
            return track.tags.iter().take(MAX_GENRES).cloned().collect();
        }

        match self.genres.genres(&track.artist).await {
            Ok(genres) => genres.into_iter().take(MAX_GENRES).collect(),
            Err(e) => {
                warning!("Genre lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn cover_image(&self, track: &NowPlayingRecord) -> Option<NormalizedImage> {
        let Some(mbid) = track.release_mbid.as_deref() else {
            info!("No MBID for album art.");
            return None;
        };

        let raw = match self.art.cover_art(mbid).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warning!("Album art lookup failed: {}", e);
                return None;
            }
        };

        match post::normalize(&raw, &self.limits) {
            Ok(image) => {
                info!(
                    "Image normalized to {}x{}, {} bytes at quality {}.",
                    image.width,
                    image.height,
                    image.bytes.len(),
                    image.quality
                );
                Some(image)
            }
            Err(e) => {
                warning!("Cannot prepare album art, posting text only: {}", e);
                None
            }
        }
    }
}
