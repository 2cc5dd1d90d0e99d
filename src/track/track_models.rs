use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_CHARS: usize = 120;
pub const ARTIST_MAX_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: usize,
    pub title: String,
    pub artist: String,
    /// Stored-file reference, opaque outside of the storage collaborator.
    pub filename: String,
    pub creator_id: usize,
    pub is_platform: bool,
    /// Unix seconds.
    pub created: i64,
}

#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub filename: String,
    pub creator_id: usize,
    pub is_platform: bool,
}

/// Which tracks a listing draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackCategory {
    #[default]
    All,
    /// Uploaded by regular users.
    User,
    Platform,
}

impl TrackCategory {
    /// Parses a category from a query parameter. Anything unrecognised,
    /// including a missing value, is `All`.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("user") => TrackCategory::User,
            Some("platform") => TrackCategory::Platform,
            _ => TrackCategory::All,
        }
    }
}

/// A track enriched with engagement counts and creator identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackView {
    pub id: usize,
    pub title: String,
    pub artist: String,
    pub creator_id: usize,
    pub creator_nickname: String,
    pub filename: String,
    pub file_url: String,
    pub is_platform: bool,
    pub likes_count: u64,
    pub plays_count: u64,
    pub created: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackUpdateBody {
    pub title: String,
    #[serde(default)]
    pub artist: String,
}

pub fn validate_title(title: &str) -> CoreResult<()> {
    let chars = title.chars().count();
    if chars == 0 || title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".to_string()));
    }
    if chars > TITLE_MAX_CHARS {
        return Err(CoreError::Validation(format!(
            "Title must be at most {} characters",
            TITLE_MAX_CHARS
        )));
    }
    Ok(())
}

pub fn validate_artist(artist: &str) -> CoreResult<()> {
    if artist.chars().count() > ARTIST_MAX_CHARS {
        return Err(CoreError::Validation(format!(
            "Artist must be at most {} characters",
            ARTIST_MAX_CHARS
        )));
    }
    Ok(())
}
