//! ListenBrainz to Bluesky "now playing" bot.
//!
//! This library polls the ListenBrainz `playing-now` endpoint, enriches the
//! current track with cover art and genre tags, checks a local ledger so that
//! a track is posted at most once per UTC day, and publishes a Bluesky post
//! with hashtag facets and an optional cover image.
//!
//! # Modules
//!
//! - `bluesky` - Bluesky XRPC client (session, blob upload, post records)
//! - `config` - Configuration loaded once from the environment and `.env` files
//! - `coverart` - Cover Art Archive lookups
//! - `cycle` - A single check: fetch, dedup, enrich, assemble, publish, record
//! - `http` - Shared HTTP client with timeout and retry policy
//! - `listenbrainz` - Now-playing lookups
//! - `management` - Persistent post ledger and Bluesky session management
//! - `musicbrainz` - Artist genre tag lookups
//! - `post` - Caption assembly, hashtag facets and image normalization
//! - `scheduler` - The interval loop around the check cycle
//! - `types` - Data structures and API payloads
//! - `utils` - Small helpers shared across modules
//!
//! # Example
//!
//! ```
//! use lbsky::{config, cycle::LiveCheckCycle, scheduler::Scheduler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> lbsky::Res<()> {
//!     config::load_env().await;
//!     let config = config::Config::from_env()?;
//!     let cycle = LiveCheckCycle::from_config(&config)?;
//!     Scheduler::new(cycle, config.check_interval).run().await;
//!     Ok(())
//! }
//! ```

pub mod bluesky;
pub mod config;
pub mod coverart;
pub mod cycle;
pub mod http;
pub mod listenbrainz;
pub mod management;
pub mod musicbrainz;
pub mod post;
pub mod scheduler;
pub mod types;
pub mod utils;

/// A convenient Result type alias for top-level plumbing.
///
/// Component boundaries use their own typed errors; this alias is for the
/// entry point where any of them may surface.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Every line is prefixed with a UTC timestamp since the bot runs unattended
/// and its log is the only place failures show up.
///
/// # Example
///
/// ```
/// info!("Checking ListenBrainz...");
/// info!("Now playing: {} - {}", artist, title);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("{} [{}] {}", $crate::utils::timestamp().dimmed(), "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Post published: {}", uri);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("{} [{}] {}", $crate::utils::timestamp().dimmed(), "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for startup failures. Anything that happens inside a check
/// cycle is reported with [`warning!`] so the loop keeps running.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("{} [{}] {}", $crate::utils::timestamp().dimmed(), "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("No album art available.");
/// warning!("Check failed: {}", err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("{} [{}] {}", $crate::utils::timestamp().dimmed(), "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
