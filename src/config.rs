//! Configuration management for lbsky.
//!
//! Values come from environment variables and `.env` files. They are read
//! once at startup into a [`Config`] which is then passed by reference to the
//! components that need it.
//!
//! The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 240;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
/// Stays under Bluesky's ~976.56 KiB blob limit.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 950 * 1024;
pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 2000;
pub const DEFAULT_START_QUALITY: u8 = 95;
pub const DEFAULT_QUALITY_FLOOR: u8 = 10;
pub const DEFAULT_QUALITY_STEP: u8 = 10;
pub const MAX_GENRES: usize = 3;

const DEFAULT_LB_API_URL: &str = "https://api.listenbrainz.org";
const DEFAULT_COVERART_API_URL: &str = "https://coverartarchive.org";
const DEFAULT_MUSICBRAINZ_API_URL: &str = "https://musicbrainz.org";
const DEFAULT_BLUESKY_SERVICE: &str = "https://bsky.social";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Limits applied by the image normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLimits {
    pub max_bytes: usize,
    pub max_dimension: u32,
    pub start_quality: u8,
    pub quality_floor: u8,
    pub quality_step: u8,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_dimension: DEFAULT_MAX_IMAGE_DIMENSION,
            start_quality: DEFAULT_START_QUALITY,
            quality_floor: DEFAULT_QUALITY_FLOOR,
            quality_step: DEFAULT_QUALITY_STEP,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listenbrainz_user: String,
    pub listenbrainz_token: String,
    pub listenbrainz_api_url: String,
    pub bluesky_handle: String,
    pub bluesky_password: String,
    pub bluesky_service: String,
    pub coverart_api_url: String,
    pub musicbrainz_api_url: String,
    pub check_interval: Duration,
    pub request_timeout: Duration,
    pub image: ImageLimits,
    pub ledger_path: PathBuf,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`] when a required key has no value
    /// - [`ConfigError::Invalid`] when a numeric key does not parse or is zero
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let image = ImageLimits {
            max_bytes: parse_or(&get, "MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            max_dimension: parse_or(&get, "MAX_IMAGE_DIMENSION", DEFAULT_MAX_IMAGE_DIMENSION)?,
            ..ImageLimits::default()
        };

        Ok(Self {
            listenbrainz_user: required("LB_USERNAME")?,
            listenbrainz_token: required("LB_TOKEN")?,
            listenbrainz_api_url: get("LB_API_URL")
                .unwrap_or_else(|| DEFAULT_LB_API_URL.to_string()),
            bluesky_handle: required("BLUESKY_HANDLE")?,
            bluesky_password: required("BLUESKY_PASSWORD")?,
            bluesky_service: get("BLUESKY_SERVICE")
                .unwrap_or_else(|| DEFAULT_BLUESKY_SERVICE.to_string()),
            coverart_api_url: get("COVERART_API_URL")
                .unwrap_or_else(|| DEFAULT_COVERART_API_URL.to_string()),
            musicbrainz_api_url: get("MUSICBRAINZ_API_URL")
                .unwrap_or_else(|| DEFAULT_MUSICBRAINZ_API_URL.to_string()),
            check_interval: Duration::from_secs(parse_or(
                &get,
                "CHECK_INTERVAL",
                DEFAULT_CHECK_INTERVAL_SECS,
            )?),
            request_timeout: Duration::from_secs(parse_or(
                &get,
                "REQUEST_TIMEOUT",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            image,
            ledger_path: get("LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_ledger_path),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) if v != T::default() => Ok(v),
            _ => Err(ConfigError::Invalid { key, value: raw }),
        },
    }
}

fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("lbsky");
    path
}

pub fn default_ledger_path() -> PathBuf {
    let mut path = data_dir();
    path.push("state/posts.json");
    path
}

/// Loads environment variables from `.env` files.
///
/// Looks in the local data directory first (`lbsky/.env`, created if
/// missing), then in the working directory. Variables already present in the
/// process environment are never overwritten. Missing files are fine.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/lbsky/.env`
/// - macOS: `~/Library/Application Support/lbsky/.env`
/// - Windows: `%LOCALAPPDATA%/lbsky/.env`
pub async fn load_env() {
    let dir = data_dir();
    if let Err(e) = async_fs::create_dir_all(&dir).await {
        crate::warning!("Cannot create {}: {}", dir.display(), e);
    }

    let path = dir.join(".env");
    if path.is_file() {
        if let Err(e) = dotenv::from_path(&path) {
            crate::warning!("Cannot read {}: {}", path.display(), e);
        }
    }

    dotenv::dotenv().ok();
}
