use std::path::Path;

use crate::models::TrackRecord;

/// Guess a TrackRecord from a filename, used as the starting point for
/// recovery when the fingerprint lookup comes back empty.
///
/// Supported patterns:
/// - "Artist - Title.mp3"
/// - "01. Title.mp3"
/// - "01 Artist - Title.mp3"
/// - "Title.mp3" (fallback)
///
/// Fields that cannot be derived are left empty.
pub fn parse_filename(path: &Path) -> TrackRecord {
    let stem = match path.file_stem().and_then(|s| s.to_str()) {
        Some(s) => s.trim(),
        None => return TrackRecord::default(),
    };

    if let Some(track) = strip_track_number(stem).and_then(split_artist_title) {
        return track;
    }

    if let Some(track) = split_artist_title(stem) {
        return track;
    }

    if let Some(rest) = strip_track_number(stem) {
        return TrackRecord::new(rest.trim(), "");
    }

    TrackRecord::new(stem, "")
}

fn split_artist_title(stem: &str) -> Option<TrackRecord> {
    let (artist, title) = stem.split_once(" - ")?;
    let artist = artist.trim();
    let title = title.trim();

    if artist.is_empty() || title.is_empty() {
        return None;
    }

    Some(TrackRecord::new(title, artist))
}

fn strip_track_number(stem: &str) -> Option<&str> {
    let digits = stem.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    // Number must be followed by "." and/or spaces ("2Pac" is not a track number)
    let rest = &stem[digits..];
    if !rest.starts_with(|c: char| c == '.' || c == ' ') {
        return None;
    }
    let rest = rest.strip_prefix('.').unwrap_or(rest).trim_start();

    if rest.is_empty() {
        return None;
    }

    Some(rest)
}
