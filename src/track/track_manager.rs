use super::aggregation::aggregate_tracks;
use super::ranking::RankBadges;
use super::search::SearchFilter;
use super::track_models::{
    validate_artist, validate_title, NewTrack, Track, TrackCategory, TrackView,
};
use crate::error::{CoreError, CoreResult};
use crate::store::FullStore;
use crate::user::User;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// The public track listing: enriched tracks, their badges and, for a
/// signed-in viewer, which of them the viewer liked.
#[derive(Debug, Serialize)]
pub struct TrackListing {
    pub tracks: Vec<TrackView>,
    #[serde(flatten)]
    pub badges: RankBadges,
    pub liked_ids: BTreeSet<usize>,
    pub query: String,
    pub filter: TrackCategory,
}

/// Track operations over one store session.
pub struct TrackManager<'a> {
    store: &'a dyn FullStore,
}

impl<'a> TrackManager<'a> {
    pub fn new(store: &'a dyn FullStore) -> Self {
        Self { store }
    }

    fn existing_track(&self, track_id: usize) -> CoreResult<Track> {
        self.store
            .get_track(track_id)?
            .ok_or_else(|| CoreError::not_found("Track", track_id))
    }

    fn owned_track(&self, actor: &User, track_id: usize) -> CoreResult<Track> {
        let track = self.existing_track(track_id)?;
        if track.creator_id != actor.id {
            return Err(CoreError::Authorization(format!(
                "Track {} belongs to another user",
                track_id
            )));
        }
        Ok(track)
    }

    /// Registers an already stored file as a new track of `actor`.
    pub fn upload(
        &self,
        actor: &User,
        title: &str,
        artist: &str,
        stored_filename: String,
    ) -> CoreResult<Track> {
        validate_title(title)?;
        validate_artist(artist)?;
        let track = self.store.create_track(&NewTrack {
            title: title.to_string(),
            artist: artist.to_string(),
            filename: stored_filename,
            creator_id: actor.id,
            is_platform: false,
        })?;
        info!("User {} uploaded track {}", actor.id, track.id);
        Ok(track)
    }

    pub fn like(&self, actor: &User, track_id: usize) -> CoreResult<()> {
        self.existing_track(track_id)?;
        if !self.store.add_favorite(actor.id, track_id)? {
            debug!("User {} already liked track {}", actor.id, track_id);
        }
        Ok(())
    }

    pub fn unlike(&self, actor: &User, track_id: usize) -> CoreResult<()> {
        self.existing_track(track_id)?;
        self.store.remove_favorite(actor.id, track_id)?;
        Ok(())
    }

    pub fn play(&self, actor: Option<&User>, track_id: usize) -> CoreResult<()> {
        self.existing_track(track_id)?;
        self.store.record_play(track_id, actor.map(|user| user.id))
    }

    pub fn update(
        &self,
        actor: &User,
        track_id: usize,
        title: &str,
        artist: &str,
    ) -> CoreResult<Track> {
        self.owned_track(actor, track_id)?;
        validate_title(title)?;
        validate_artist(artist)?;
        self.store.update_track(track_id, title, artist)?;
        self.existing_track(track_id)
    }

    /// Deletes the track with its favorites and plays, returning what was deleted.
    pub fn delete(&self, actor: &User, track_id: usize) -> CoreResult<Track> {
        let track = self.owned_track(actor, track_id)?;
        self.store.delete_track(track_id)?;
        info!("User {} deleted track {}", actor.id, track_id);
        Ok(track)
    }

    pub fn liked_ids(&self, viewer: Option<&User>) -> CoreResult<BTreeSet<usize>> {
        match viewer {
            Some(user) => Ok(self
                .store
                .favorite_track_ids(user.id)?
                .into_iter()
                .collect()),
            None => Ok(BTreeSet::new()),
        }
    }

    pub fn listing(&self, filter: &SearchFilter, viewer: Option<&User>) -> CoreResult<TrackListing> {
        let candidates = filter.select(self.store)?;
        let tracks = aggregate_tracks(self.store, &candidates)?;
        let badges = RankBadges::classify(&tracks);
        Ok(TrackListing {
            tracks,
            badges,
            liked_ids: self.liked_ids(viewer)?,
            query: filter.query.clone().unwrap_or_default(),
            filter: filter.category,
        })
    }
}
