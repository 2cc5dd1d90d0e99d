//! Storage traits consumed by the account, track and profile operations.
//!
//! Implementations are scoped handles: one is acquired at the start of a
//! request and dropped at its end, so none of these traits require `Sync`.

use crate::error::CoreResult;
use crate::track::{NewTrack, Track, TrackCategory};
use crate::user::{User, UserCredentials};
use std::collections::HashMap;

pub trait UserStore {
    /// Inserts a user, failing with `Conflict` if the nickname is taken.
    fn create_user(&self, nickname: &str, password_hash: Option<&str>) -> CoreResult<User>;

    fn get_user(&self, user_id: usize) -> CoreResult<Option<User>>;

    fn get_user_by_nickname(&self, nickname: &str) -> CoreResult<Option<User>>;

    fn get_user_credentials(&self, nickname: &str) -> CoreResult<Option<UserCredentials>>;

    /// Renames a user in a single statement, failing with `Conflict` if the
    /// nickname belongs to someone else.
    fn rename_user(&self, user_id: usize, nickname: &str) -> CoreResult<()>;

    /// Case-insensitive substring match over nicknames, at most `limit` users.
    fn search_users(&self, query: &str, limit: usize) -> CoreResult<Vec<User>>;
}

pub trait TrackStore {
    fn create_track(&self, track: &NewTrack) -> CoreResult<Track>;

    fn get_track(&self, track_id: usize) -> CoreResult<Option<Track>>;

    fn get_track_by_filename(&self, filename: &str) -> CoreResult<Option<Track>>;

    fn update_track(&self, track_id: usize, title: &str, artist: &str) -> CoreResult<()>;

    /// Deletes the track together with every favorite and play referencing it.
    fn delete_track(&self, track_id: usize) -> CoreResult<()>;

    /// Most recent first, capped at `limit`. `query`, when present, is matched
    /// case-insensitively as a substring of the title.
    fn search_tracks(
        &self,
        query: Option<&str>,
        category: TrackCategory,
        limit: usize,
    ) -> CoreResult<Vec<Track>>;

    /// Tracks uploaded by a user, most recent first.
    fn tracks_by_creator(&self, creator_id: usize) -> CoreResult<Vec<Track>>;

    /// Tracks with the given ids, in the order of `track_ids`. Missing ids are skipped.
    fn tracks_by_ids(&self, track_ids: &[usize]) -> CoreResult<Vec<Track>>;
}

pub trait EngagementStore {
    /// Returns false when the favorite already existed.
    fn add_favorite(&self, user_id: usize, track_id: usize) -> CoreResult<bool>;

    /// Returns false when there was nothing to remove.
    fn remove_favorite(&self, user_id: usize, track_id: usize) -> CoreResult<bool>;

    /// Ids of the tracks a user liked, most recently liked first.
    fn favorite_track_ids(&self, user_id: usize) -> CoreResult<Vec<usize>>;

    fn record_play(&self, track_id: usize, user_id: Option<usize>) -> CoreResult<()>;
}

/// Grouped lookups backing track aggregation. Each call is a single query.
pub trait EngagementLookup {
    fn like_counts(&self, track_ids: &[usize]) -> CoreResult<HashMap<usize, u64>>;

    fn play_counts(&self, track_ids: &[usize]) -> CoreResult<HashMap<usize, u64>>;

    fn creator_nicknames(&self, user_ids: &[usize]) -> CoreResult<HashMap<usize, String>>;
}

pub trait FullStore: UserStore + TrackStore + EngagementStore + EngagementLookup {}

impl<T: UserStore + TrackStore + EngagementStore + EngagementLookup> FullStore for T {}
