use super::track_models::TrackView;
use serde::Serialize;
use std::collections::BTreeSet;

/// Badge sets of a result set. A track id is in at most one of them: `hit`
/// for leading both plays and likes, otherwise `top_play` or `top_like`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankBadges {
    pub hit_ids: BTreeSet<usize>,
    pub top_play_ids: BTreeSet<usize>,
    pub top_like_ids: BTreeSet<usize>,
}

impl RankBadges {
    /// Every track holding the maximum play (like) count leads that metric,
    /// ties included. A maximum of zero leads nothing.
    pub fn classify(tracks: &[TrackView]) -> Self {
        let max_play = tracks.iter().map(|t| t.plays_count).max().unwrap_or(0);
        let max_like = tracks.iter().map(|t| t.likes_count).max().unwrap_or(0);

        let mut badges = RankBadges::default();
        for track in tracks {
            let play_leader = max_play > 0 && track.plays_count == max_play;
            let like_leader = max_like > 0 && track.likes_count == max_like;
            match (play_leader, like_leader) {
                (true, true) => badges.hit_ids.insert(track.id),
                (true, false) => badges.top_play_ids.insert(track.id),
                (false, true) => badges.top_like_ids.insert(track.id),
                (false, false) => false,
            };
        }
        badges
    }
}
