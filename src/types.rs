use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The track currently reported by the now-playing source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NowPlayingRecord {
    pub artist: String,
    pub title: String,
    pub release: Option<String>,
    pub release_mbid: Option<String>,
    pub release_year: Option<String>,
    pub tags: Vec<String>,
}

/// A row in the post ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub artist: String,
    pub title: String,
    pub date: NaiveDate,
}

/// Caption and ordered hashtags, before facets are computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub caption: String,
    pub hashtags: Vec<String>,
}

/// A hashtag annotation anchored to UTF-8 byte offsets of the final text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub byte_start: usize,
    pub byte_end: usize,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetedText {
    pub text: String,
    pub facets: Vec<Facet>,
}

/// JPEG bytes that fit the configured pixel bounds.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub attempts: u32,
}

/// Everything the publisher needs for one post.
#[derive(Debug, Clone)]
pub struct OutgoingPost {
    pub text: FacetedText,
    pub image: Option<NormalizedImage>,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub uri: String,
    pub cid: String,
}

// ListenBrainz payloads

#[derive(Debug, Clone, Deserialize)]
pub struct PlayingNowResponse {
    #[serde(default)]
    pub payload: PlayingNowPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayingNowPayload {
    #[serde(default)]
    pub listens: Vec<Listen>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Listen {
    pub track_metadata: TrackMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackMetadata {
    pub artist_name: Option<String>,
    pub track_name: Option<String>,
    pub release_name: Option<String>,
    pub release_year: Option<Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub additional_info: AdditionalInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdditionalInfo {
    pub release_mbid: Option<String>,
}

// MusicBrainz payloads

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistSearchResponse {
    #[serde(default)]
    pub artists: Vec<MusicBrainzArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MusicBrainzArtist {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<MusicBrainzTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MusicBrainzTag {
    pub name: String,
    #[serde(default)]
    pub count: i64,
}

// Bluesky payloads

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub handle: String,
    pub did: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadBlobResponse {
    pub blob: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordResponse {
    pub uri: String,
    pub cid: String,
}
