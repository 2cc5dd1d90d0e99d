use super::session::CurrentUser;
use super::state::ServerState;
use crate::error::{CoreError, CoreResult};
use crate::track::{
    aggregate_tracks, validate_artist, validate_title, SearchFilter, Track, TrackListing,
    TrackManager, TrackUpdateBody, TrackView,
};
use crate::store::StoreSession;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Deserialize, Debug, Default)]
pub struct ListingParams {
    pub q: Option<String>,
    pub filter: Option<String>,
}

fn track_view(session: &StoreSession, track: Track) -> CoreResult<TrackView> {
    let track_id = track.id;
    aggregate_tracks(session, &[track])?
        .pop()
        .ok_or_else(|| CoreError::not_found("Track", track_id))
}

async fn list_tracks(
    user: Option<CurrentUser>,
    State(state): State<ServerState>,
    Query(params): Query<ListingParams>,
) -> CoreResult<Json<TrackListing>> {
    let filter = SearchFilter::from_params(params.q.as_deref(), params.filter.as_deref());
    let session = state.store.open_session()?;
    let listing = TrackManager::new(&session).listing(&filter, user.as_ref().map(|u| &u.0))?;
    Ok(Json(listing))
}

struct UploadForm {
    title: String,
    artist: String,
    file_name: Option<String>,
    bytes: Bytes,
}

fn invalid_form(err: impl std::fmt::Display) -> CoreError {
    CoreError::Validation(format!("Invalid upload form: {}", err))
}

async fn read_upload_form(mut multipart: Multipart) -> CoreResult<UploadForm> {
    let mut title = None;
    let mut artist = String::new();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(field.text().await.map_err(invalid_form)?),
            "artist" => artist = field.text().await.map_err(invalid_form)?,
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid_form)?;
                file = Some((file_name, bytes));
            }
            other => debug!("Ignoring upload form field {:?}", other),
        }
    }

    let title = title.ok_or_else(|| CoreError::Validation("Missing title".to_string()))?;
    let (file_name, bytes) =
        file.ok_or_else(|| CoreError::Validation("Missing file".to_string()))?;
    Ok(UploadForm {
        title,
        artist,
        file_name,
        bytes,
    })
}

async fn upload_track(
    CurrentUser(user): CurrentUser,
    State(state): State<ServerState>,
    multipart: Multipart,
) -> CoreResult<impl IntoResponse> {
    let form = read_upload_form(multipart).await?;
    validate_title(&form.title)?;
    validate_artist(&form.artist)?;

    let filename = state
        .file_storage
        .save(form.file_name.as_deref(), &form.bytes)
        .await?;

    let created = state.store.open_session().and_then(|session| {
        let track =
            TrackManager::new(&session).upload(&user, &form.title, &form.artist, filename.clone())?;
        track_view(&session, track)
    });
    match created {
        Ok(view) => Ok((StatusCode::CREATED, Json(view))),
        Err(err) => {
            state.file_storage.remove(&filename).await;
            Err(err)
        }
    }
}

async fn like_track(
    CurrentUser(user): CurrentUser,
    State(state): State<ServerState>,
    Path(track_id): Path<usize>,
) -> CoreResult<StatusCode> {
    let session = state.store.open_session()?;
    TrackManager::new(&session).like(&user, track_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unlike_track(
    CurrentUser(user): CurrentUser,
    State(state): State<ServerState>,
    Path(track_id): Path<usize>,
) -> CoreResult<StatusCode> {
    let session = state.store.open_session()?;
    TrackManager::new(&session).unlike(&user, track_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn play_track(
    user: Option<CurrentUser>,
    State(state): State<ServerState>,
    Path(track_id): Path<usize>,
) -> CoreResult<impl IntoResponse> {
    let session = state.store.open_session()?;
    TrackManager::new(&session).play(user.as_ref().map(|u| &u.0), track_id)?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn update_track(
    CurrentUser(user): CurrentUser,
    State(state): State<ServerState>,
    Path(track_id): Path<usize>,
    Json(body): Json<TrackUpdateBody>,
) -> CoreResult<Json<TrackView>> {
    let session = state.store.open_session()?;
    let track = TrackManager::new(&session).update(&user, track_id, &body.title, &body.artist)?;
    Ok(Json(track_view(&session, track)?))
}

async fn delete_track(
    CurrentUser(user): CurrentUser,
    State(state): State<ServerState>,
    Path(track_id): Path<usize>,
) -> CoreResult<StatusCode> {
    let deleted = state
        .store
        .open_session()
        .and_then(|session| TrackManager::new(&session).delete(&user, track_id))?;
    // Seeded files are the source of platform tracks and stay on disk.
    if !deleted.is_platform {
        state.file_storage.remove(&deleted.filename).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn make_track_routes(state: ServerState) -> Router {
    Router::new()
        .route(
            "/upload",
            post(upload_track).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/{id}/like", post(like_track))
        .route("/{id}/unlike", post(unlike_track))
        .route("/{id}/play", post(play_track))
        .route("/{id}/update", post(update_track))
        .route("/{id}/delete", post(delete_track))
        .with_state(state)
}

/// Routes with absolute paths, to be merged rather than nested.
pub fn make_listing_routes(state: ServerState) -> Router {
    Router::new()
        .route("/api/tracks", get(list_tracks))
        .with_state(state)
}
