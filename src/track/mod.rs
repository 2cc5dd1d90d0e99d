mod aggregation;
mod profile;
mod ranking;
mod search;
pub mod seed;
mod storage;
mod track_manager;
mod track_models;

pub use aggregation::aggregate_tracks;
pub use profile::{MyProfileView, ProfileAssembler, ProfileView, TrackSection};
pub use ranking::RankBadges;
pub use search::{search_profiles, SearchFilter, PROFILE_SEARCH_LIMIT, TRACK_SEARCH_LIMIT};
pub use storage::{public_path, FileStorage, PUBLIC_UPLOADS_PATH};
pub use track_manager::{TrackListing, TrackManager};
pub use track_models::{
    validate_artist, validate_title, NewTrack, Track, TrackCategory, TrackUpdateBody, TrackView,
};
