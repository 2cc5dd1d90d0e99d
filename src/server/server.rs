use anyhow::{Context, Result};
use std::time::Duration;

use tracing::info;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tower_http::services::ServeDir;

use super::profile_routes::make_profile_routes;
use super::session::{with_session_cookie, without_session_cookie, CurrentUser};
use super::state::ServerState;
use super::track_routes::{make_listing_routes, make_track_routes};
use super::log_requests;
use crate::error::CoreResult;
use crate::track::PUBLIC_UPLOADS_PATH;
use crate::user::{ChangeNicknameBody, LoginBody, SignupBody, UserManager, UserSummary};

const SERVICE_NAME: &str = "music-platform-server";

#[derive(Serialize)]
struct ServerStats {
    pub name: &'static str,
    pub uptime: String,
    pub user: Option<UserSummary>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(user: Option<CurrentUser>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        name: SERVICE_NAME,
        uptime: format_uptime(state.start_time.elapsed()),
        user: user.map(|CurrentUser(user)| UserSummary::from(user)),
    };
    Json(stats)
}

async fn signup(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(body): Json<SignupBody>,
) -> CoreResult<impl IntoResponse> {
    let session = state.store.open_session()?;
    let user = UserManager::new(&session).signup(&body.nickname, &body.password)?;
    info!("New user {} (id={})", user.nickname, user.id);
    let jar = with_session_cookie(jar, &state, user.id);
    Ok((StatusCode::CREATED, jar, Json(UserSummary::from(user))))
}

async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> CoreResult<impl IntoResponse> {
    let session = state.store.open_session()?;
    let user = UserManager::new(&session).login(&body.nickname, &body.password)?;
    let jar = with_session_cookie(jar, &state, user.id);
    Ok((jar, Json(UserSummary::from(user))))
}

async fn logout(State(state): State<ServerState>, jar: CookieJar) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        without_session_cookie(jar, &state.config),
    )
}

async fn change_nickname(
    CurrentUser(user): CurrentUser,
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(body): Json<ChangeNicknameBody>,
) -> CoreResult<impl IntoResponse> {
    let session = state.store.open_session()?;
    let renamed = UserManager::new(&session).change_nickname(&user, &body.nickname)?;
    let jar = with_session_cookie(jar, &state, renamed.id);
    Ok((jar, Json(UserSummary::from(renamed))))
}

pub fn make_app(state: ServerState) -> Router {
    let auth_routes: Router = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/nickname", post(change_nickname))
        .with_state(state.clone());

    let uploads_service = ServeDir::new(state.file_storage.upload_dir());

    let mut app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/auth", auth_routes)
        .nest("/tracks", make_track_routes(state.clone()))
        .merge(make_listing_routes(state.clone()))
        .merge(make_profile_routes(state.clone()))
        .nest_service(PUBLIC_UPLOADS_PATH, uploads_service);

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));
    app
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerConfig;
    use crate::store::SqliteStore;
    use crate::track::FileStorage;
    use crate::user::SessionTokenCodec;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn make_test_app(dir: &TempDir) -> Router {
        let store = SqliteStore::new(dir.path().join("test.db")).unwrap();
        let file_storage = FileStorage::new(dir.path().join("uploads"));
        let codec = SessionTokenCodec::new("test-secret", chrono::Duration::days(7)).unwrap();
        make_app(ServerState::new(
            ServerConfig::default(),
            store,
            file_storage,
            codec,
        ))
    }

    fn session_cookie_of(response: &axum::response::Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn home_responds_without_session() {
        let dir = TempDir::new().unwrap();
        let app = make_test_app(&dir);

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["name"], SERVICE_NAME);
        assert!(json["user"].is_null());
    }

    #[tokio::test]
    async fn responds_unauthorized_on_protected_routes() {
        let dir = TempDir::new().unwrap();
        let app = make_test_app(&dir);

        let protected_routes = vec![
            ("GET", "/api/profiles/me"),
            ("POST", "/auth/nickname"),
            ("POST", "/tracks/upload"),
            ("POST", "/tracks/1/like"),
            ("POST", "/tracks/1/unlike"),
            ("POST", "/tracks/1/update"),
            ("POST", "/tracks/1/delete"),
        ];

        for (method, route) in protected_routes.into_iter() {
            let request = Request::builder()
                .method(method)
                .uri(route)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", route);
        }
    }

    #[tokio::test]
    async fn tampered_cookie_is_anonymous_on_lenient_routes() {
        let dir = TempDir::new().unwrap();
        let app = make_test_app(&dir);

        let request = Request::builder()
            .uri("/api/tracks")
            .header(header::COOKIE, "music_session=bogus.token")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::builder()
            .uri("/api/profiles/me")
            .header(header::COOKIE, "music_session=bogus.token")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signup_issues_a_working_session_cookie() {
        let dir = TempDir::new().unwrap();
        let app = make_test_app(&dir);

        let request = Request::builder()
            .method("POST")
            .uri("/auth/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"nickname":"alice","password":"secret"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = session_cookie_of(&response);
        assert!(cookie.starts_with("music_session="));

        let request = Request::builder()
            .uri("/api/profiles/me")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["user"]["nickname"], "alice");
    }

    #[tokio::test]
    async fn track_ids_beyond_storage_range_are_not_found() {
        let dir = TempDir::new().unwrap();
        let app = make_test_app(&dir);
        let huge_id = "9223372036854775808";

        let request = Request::builder()
            .method("POST")
            .uri(format!("/tracks/{}/play", huge_id))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let request = Request::builder()
            .method("POST")
            .uri("/auth/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"nickname":"alice","password":"secret"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let cookie = session_cookie_of(&response);

        for action in ["like", "unlike", "delete"] {
            let request = Request::builder()
                .method("POST")
                .uri(format!("/tracks/{}/{}", huge_id, action))
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", action);
        }
    }
}
