#![allow(dead_code)]

pub mod stub_server;

use std::{cell::Cell, collections::HashMap, io::Cursor, path::PathBuf, rc::Rc};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lbsky::{
    bluesky::PublishError,
    config::Config,
    cycle::{ArtSource, GenreSource, NowPlayingSource, Publisher},
    http::FetchError,
    types::{NowPlayingRecord, OutgoingPost, PublishReceipt},
};
use reqwest::StatusCode;

pub fn temp_ledger_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("lbsky-test-{}", rand::random::<u64>()))
        .join("posts.json")
}

/// Config with every remote service pointed at `url`.
pub fn config_for(url: &str) -> Config {
    let vars: HashMap<&str, String> = [
        ("LB_USERNAME", "listener".to_string()),
        ("LB_TOKEN", "lb-token".to_string()),
        ("BLUESKY_HANDLE", "bot.bsky.social".to_string()),
        ("BLUESKY_PASSWORD", "app-password".to_string()),
        ("BLUESKY_SERVICE", url.to_string()),
        ("LB_API_URL", url.to_string()),
        ("COVERART_API_URL", url.to_string()),
        ("MUSICBRAINZ_API_URL", url.to_string()),
        ("LEDGER_PATH", temp_ledger_path().display().to_string()),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn track(artist: &str, title: &str) -> NowPlayingRecord {
    NowPlayingRecord {
        artist: artist.to_string(),
        title: title.to_string(),
        ..Default::default()
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

pub fn noise_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |_, _| {
        Rgb([rand::random::<u8>(), rand::random::<u8>(), rand::random::<u8>()])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

fn unavailable(service: &'static str) -> FetchError {
    FetchError::Status {
        service,
        status: StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub struct FakeNowPlaying {
    pub track: Option<NowPlayingRecord>,
    pub fail: bool,
}

impl FakeNowPlaying {
    pub fn playing(track: NowPlayingRecord) -> Self {
        Self {
            track: Some(track),
            fail: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            track: None,
            fail: false,
        }
    }

    pub fn down() -> Self {
        Self {
            track: None,
            fail: true,
        }
    }
}

impl NowPlayingSource for FakeNowPlaying {
    async fn now_playing(&self) -> Result<Option<NowPlayingRecord>, FetchError> {
        if self.fail {
            return Err(unavailable("ListenBrainz"));
        }
        Ok(self.track.clone())
    }
}

pub struct FakeArt {
    pub bytes: Option<Vec<u8>>,
    pub fail: bool,
}

impl FakeArt {
    pub fn none() -> Self {
        Self {
            bytes: None,
            fail: false,
        }
    }

    pub fn with(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            fail: false,
        }
    }

    pub fn down() -> Self {
        Self {
            bytes: None,
            fail: true,
        }
    }
}

impl ArtSource for FakeArt {
    async fn cover_art(&self, _release_mbid: &str) -> Result<Option<Vec<u8>>, FetchError> {
        if self.fail {
            return Err(unavailable("Cover Art Archive"));
        }
        Ok(self.bytes.clone())
    }
}

pub struct FakeGenres {
    pub genres: Vec<String>,
    pub fail: bool,
    pub calls: Rc<Cell<usize>>,
}

impl FakeGenres {
    pub fn with(genres: &[&str]) -> Self {
        Self {
            genres: genres.iter().map(|g| g.to_string()).collect(),
            fail: false,
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn down() -> Self {
        Self {
            genres: Vec::new(),
            fail: true,
            calls: Rc::new(Cell::new(0)),
        }
    }
}

impl GenreSource for FakeGenres {
    async fn genres(&self, _artist: &str) -> Result<Vec<String>, FetchError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(unavailable("MusicBrainz"));
        }
        Ok(self.genres.clone())
    }
}

#[derive(Default)]
pub struct FakePublisher {
    pub posts: Vec<OutgoingPost>,
    pub failures_left: usize,
    pub attempts: usize,
    pub invalidations: usize,
}

impl FakePublisher {
    pub fn failing(times: usize) -> Self {
        Self {
            failures_left: times,
            ..Default::default()
        }
    }
}

impl Publisher for FakePublisher {
    async fn publish(&mut self, post: &OutgoingPost) -> Result<PublishReceipt, PublishError> {
        self.attempts += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(PublishError::Rejected {
                endpoint: "createRecord",
                status: StatusCode::BAD_GATEWAY,
                message: "upstream down".to_string(),
            });
        }

        self.posts.push(post.clone());
        Ok(PublishReceipt {
            uri: format!("at://did:plc:test/app.bsky.feed.post/{}", self.posts.len()),
            cid: format!("cid{}", self.posts.len()),
        })
    }

    fn invalidate_session(&mut self) {
        self.invalidations += 1;
    }
}
