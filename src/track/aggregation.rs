use super::storage::public_path;
use super::track_models::{Track, TrackView};
use crate::error::CoreResult;
use crate::store::EngagementLookup;
use std::collections::BTreeSet;

/// Enriches `tracks` with like and play counts and creator nicknames.
///
/// Output order matches input order. Regardless of the number of tracks this
/// issues exactly three lookups, and none at all for an empty input.
pub fn aggregate_tracks<L: EngagementLookup + ?Sized>(
    lookup: &L,
    tracks: &[Track],
) -> CoreResult<Vec<TrackView>> {
    if tracks.is_empty() {
        return Ok(Vec::new());
    }

    let track_ids: Vec<usize> = tracks
        .iter()
        .map(|t| t.id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let creator_ids: Vec<usize> = tracks
        .iter()
        .map(|t| t.creator_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let likes = lookup.like_counts(&track_ids)?;
    let plays = lookup.play_counts(&track_ids)?;
    let nicknames = lookup.creator_nicknames(&creator_ids)?;

    Ok(tracks
        .iter()
        .map(|track| TrackView {
            id: track.id,
            title: track.title.clone(),
            artist: track.artist.clone(),
            creator_id: track.creator_id,
            creator_nickname: nicknames.get(&track.creator_id).cloned().unwrap_or_default(),
            filename: track.filename.clone(),
            file_url: public_path(&track.filename),
            is_platform: track.is_platform,
            likes_count: likes.get(&track.id).copied().unwrap_or(0),
            plays_count: plays.get(&track.id).copied().unwrap_or(0),
            created: track.created,
        })
        .collect())
}
