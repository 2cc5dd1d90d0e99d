use super::track_models::{Track, TrackCategory};
use crate::error::CoreResult;
use crate::store::{TrackStore, UserStore};
use crate::user::User;

/// Hard ceiling on a track listing. There is no pagination past it.
pub const TRACK_SEARCH_LIMIT: usize = 50;
pub const PROFILE_SEARCH_LIMIT: usize = 20;

/// Selects the candidate tracks of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub query: Option<String>,
    pub category: TrackCategory,
}

impl SearchFilter {
    /// Builds a filter from raw query parameters. An empty query means no
    /// text filter and an unknown category means [`TrackCategory::All`].
    pub fn from_params(query: Option<&str>, category: Option<&str>) -> Self {
        SearchFilter {
            query: query.filter(|q| !q.is_empty()).map(str::to_string),
            category: TrackCategory::from_query(category),
        }
    }

    pub fn select<S: TrackStore + ?Sized>(&self, store: &S) -> CoreResult<Vec<Track>> {
        store.search_tracks(self.query.as_deref(), self.category, TRACK_SEARCH_LIMIT)
    }
}

/// Users whose nickname contains `query`, case-insensitively. An absent or
/// empty query finds nobody rather than everybody.
pub fn search_profiles<S: UserStore + ?Sized>(
    store: &S,
    query: Option<&str>,
) -> CoreResult<Vec<User>> {
    match query {
        Some(query) if !query.is_empty() => store.search_users(query, PROFILE_SEARCH_LIMIT),
        _ => Ok(Vec::new()),
    }
}
