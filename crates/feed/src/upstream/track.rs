// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mapping from the raw upstream payload to the normalized track record.

use crate::store::TrackRecord;
use crate::upstream::CurrentlyPlaying;

/// Normalize an upstream payload into the persisted record.
///
/// Anything that is not a playing track (no payload, no item, non-track
/// content such as podcasts or ads) maps to the explicit "not playing"
/// record.
pub fn normalize(playing: Option<CurrentlyPlaying>, now_ms: u64) -> TrackRecord {
    let Some(playing) = playing else {
        return TrackRecord::not_playing(now_ms);
    };

    let is_track = playing
        .currently_playing_type
        .as_deref()
        .map_or(true, |kind| kind == "track");
    let Some(item) = playing.item.filter(|_| is_track) else {
        return TrackRecord::not_playing(now_ms);
    };

    let artist = item
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let (album, artwork_url) = match item.album {
        Some(album) => {
            let artwork = album.images.first().map(|i| i.url.clone()).unwrap_or_default();
            (album.name, artwork)
        }
        None => (String::new(), String::new()),
    };

    let progress_ms = playing.progress_ms.unwrap_or(0);
    let percent = if item.duration_ms > 0 {
        ((progress_ms.min(item.duration_ms) * 100) / item.duration_ms) as u32
    } else {
        0
    };

    TrackRecord {
        id: item.id.unwrap_or_default(),
        title: item.name,
        artist,
        album,
        artwork_url,
        duration_ms: item.duration_ms,
        progress_ms,
        percent,
        is_playing: playing.is_playing,
        updated_at: now_ms,
    }
}

#[cfg(test)]
#[path = "track_tests.rs"]
mod tests;
