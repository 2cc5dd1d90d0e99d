use super::session::CurrentUser;
use super::state::{GuardedStore, ServerState};
use crate::error::CoreResult;
use crate::track::{search_profiles, MyProfileView, ProfileAssembler, ProfileView};
use crate::user::UserSummary;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct ProfileSearchParams {
    pub q: Option<String>,
}

async fn search(
    State(store): State<GuardedStore>,
    Query(params): Query<ProfileSearchParams>,
) -> CoreResult<Json<Vec<UserSummary>>> {
    let session = store.open_session()?;
    let users = search_profiles(&session, params.q.as_deref())?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

async fn get_my_profile(
    CurrentUser(user): CurrentUser,
    State(store): State<GuardedStore>,
) -> CoreResult<Json<MyProfileView>> {
    let session = store.open_session()?;
    Ok(Json(ProfileAssembler::new(&session).my_profile(&user)?))
}

async fn get_profile(
    viewer: Option<CurrentUser>,
    State(store): State<GuardedStore>,
    Path(nickname): Path<String>,
) -> CoreResult<Json<ProfileView>> {
    let session = store.open_session()?;
    let profile =
        ProfileAssembler::new(&session).profile(&nickname, viewer.as_ref().map(|v| &v.0))?;
    Ok(Json(profile))
}

/// Routes with absolute paths, to be merged rather than nested. `/me` never
/// collides with a nickname since nicknames are at least 3 characters long.
pub fn make_profile_routes(state: ServerState) -> Router {
    Router::new()
        .route("/api/profiles", get(search))
        .route("/api/profiles/me", get(get_my_profile))
        .route("/api/profiles/{nickname}", get(get_profile))
        .with_state(state)
}
