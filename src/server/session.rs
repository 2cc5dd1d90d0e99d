use super::state::ServerState;
use super::ServerConfig;
use crate::error::{CoreError, CoreResult};
use crate::user::{User, UserManager};

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

/// The signed-in user of a request.
///
/// As a plain extractor it rejects the request with
/// [`CoreError::Authentication`]; as `Option<CurrentUser>` every failure
/// short of a storage error degrades to `None`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn resolve_session(parts: &Parts, state: &ServerState) -> CoreResult<Option<User>> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(token) = jar.get(&state.config.session_cookie_name) else {
        debug!("No session cookie.");
        return Ok(None);
    };

    let user_id = match state.session_codec.decode(token.value()) {
        Ok(user_id) => user_id,
        Err(err) => {
            debug!("Rejected session token: {}", err);
            return Ok(None);
        }
    };

    let session = state.store.open_session()?;
    let user = UserManager::new(&session).resolve(user_id)?;
    if user.is_none() {
        debug!("Session for unknown user_id={}", user_id);
    }
    Ok(user)
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = CoreError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state)?
            .map(CurrentUser)
            .ok_or(CoreError::Authentication)
    }
}

impl OptionalFromRequestParts<ServerState> for CurrentUser {
    type Rejection = CoreError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(resolve_session(parts, state)?.map(CurrentUser))
    }
}

fn base_cookie(config: &ServerConfig, value: String) -> Cookie<'static> {
    Cookie::build((config.session_cookie_name.clone(), value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Adds a freshly signed session cookie for `user_id`.
pub fn with_session_cookie(jar: CookieJar, state: &ServerState, user_id: usize) -> CookieJar {
    let mut cookie = base_cookie(&state.config, state.session_codec.encode(user_id));
    cookie.set_max_age(time::Duration::days(
        state.config.session_max_age_days as i64,
    ));
    jar.add(cookie)
}

pub fn without_session_cookie(jar: CookieJar, config: &ServerConfig) -> CookieJar {
    jar.remove(base_cookie(config, String::new()))
}
