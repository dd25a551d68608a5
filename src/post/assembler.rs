use crate::{
    types::{NowPlayingRecord, Post},
    utils,
};

pub const BRANDING: &str = "🎧 VibesCloud Music";
pub const NOW_PLAYING_TAG: &str = "#NowPlaying";

const PROGRESS_CELLS: usize = 10;
const PROGRESS_FILLED: usize = 7;

/// Decorative bar; ListenBrainz reports no playback position.
pub fn progress_bar() -> String {
    let mut bar = "▰".repeat(PROGRESS_FILLED);
    bar.push_str(&"▱".repeat(PROGRESS_CELLS - PROGRESS_FILLED));
    bar
}

/// `♪ {artist} – {title}`, with ` ({year})` when the release year is known.
pub fn track_line(track: &NowPlayingRecord) -> String {
    match &track.release_year {
        Some(year) => format!("♪ {} – {} ({})", track.artist, track.title, year),
        None => format!("♪ {} – {}", track.artist, track.title),
    }
}

/// Builds the caption and hashtags for a track.
///
/// Returns `None` when artist or title is blank; there is nothing to post
/// and no placeholder text is made up.
pub fn assemble(track: &NowPlayingRecord, genres: &[String]) -> Option<Post> {
    if track.artist.trim().is_empty() || track.title.trim().is_empty() {
        return None;
    }

    let caption = format!(
        "{branding}\n\n{line}\n\n{bar}",
        branding = BRANDING,
        line = track_line(track),
        bar = progress_bar()
    );

    let mut hashtags = vec![NOW_PLAYING_TAG.to_string()];
    hashtags.extend(utils::hashtag(&track.artist));
    hashtags.extend(genres.iter().filter_map(|g| utils::hashtag(g)));

    Some(Post { caption, hashtags })
}
