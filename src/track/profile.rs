use super::aggregation::aggregate_tracks;
use super::ranking::RankBadges;
use super::track_models::{Track, TrackView};
use crate::error::{CoreError, CoreResult};
use crate::store::FullStore;
use crate::user::{User, UserSummary};
use serde::Serialize;
use std::collections::BTreeSet;

/// A list of enriched tracks classified on its own.
#[derive(Debug, Serialize)]
pub struct TrackSection {
    pub tracks: Vec<TrackView>,
    #[serde(flatten)]
    pub badges: RankBadges,
}

impl TrackSection {
    fn build<S: FullStore + ?Sized>(store: &S, tracks: &[Track]) -> CoreResult<Self> {
        let tracks = aggregate_tracks(store, tracks)?;
        let badges = RankBadges::classify(&tracks);
        Ok(TrackSection { tracks, badges })
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user: UserSummary,
    pub uploaded: TrackSection,
    pub favorites: TrackSection,
    /// Tracks the viewer liked, empty for anonymous viewers.
    pub liked_ids: BTreeSet<usize>,
}

#[derive(Debug, Serialize)]
pub struct MyProfileView {
    #[serde(flatten)]
    pub profile: ProfileView,
    pub uploaded_track_ids: Vec<usize>,
    pub favorite_track_ids: Vec<usize>,
}

/// Assembles profile pages over one store session.
pub struct ProfileAssembler<'a> {
    store: &'a dyn FullStore,
}

impl<'a> ProfileAssembler<'a> {
    pub fn new(store: &'a dyn FullStore) -> Self {
        Self { store }
    }

    /// Returns the profile together with the raw uploaded and favorite id lists.
    fn assemble(
        &self,
        user: &User,
        viewer: Option<&User>,
    ) -> CoreResult<(ProfileView, Vec<usize>, Vec<usize>)> {
        let uploaded = self.store.tracks_by_creator(user.id)?;
        let favorite_ids = self.store.favorite_track_ids(user.id)?;
        let favorites = self.store.tracks_by_ids(&favorite_ids)?;

        let liked_ids = match viewer {
            Some(viewer) if viewer.id == user.id => favorite_ids.iter().copied().collect(),
            Some(viewer) => self
                .store
                .favorite_track_ids(viewer.id)?
                .into_iter()
                .collect(),
            None => BTreeSet::new(),
        };

        let profile = ProfileView {
            user: UserSummary::from(user),
            uploaded: TrackSection::build(self.store, &uploaded)?,
            favorites: TrackSection::build(self.store, &favorites)?,
            liked_ids,
        };
        let uploaded_ids = uploaded.iter().map(|t| t.id).collect();
        Ok((profile, uploaded_ids, favorite_ids))
    }

    pub fn profile(&self, nickname: &str, viewer: Option<&User>) -> CoreResult<ProfileView> {
        let user = self
            .store
            .get_user_by_nickname(nickname)?
            .ok_or_else(|| CoreError::not_found("User", nickname))?;
        let (profile, _, _) = self.assemble(&user, viewer)?;
        Ok(profile)
    }

    pub fn my_profile(&self, user: &User) -> CoreResult<MyProfileView> {
        let (profile, uploaded_track_ids, favorite_track_ids) =
            self.assemble(user, Some(user))?;
        Ok(MyProfileView {
            profile,
            uploaded_track_ids,
            favorite_track_ids,
        })
    }
}
