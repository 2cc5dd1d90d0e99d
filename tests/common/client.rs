//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new anonymous client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client logged in as the regular test user
    pub async fn authenticated(base_url: String) -> Self {
        Self::authenticated_as(base_url, TEST_USER, TEST_PASS).await
    }

    /// Creates a client logged in as the given fixture user
    ///
    /// # Panics
    ///
    /// Panics if login fails (indicates test infrastructure problem).
    pub async fn authenticated_as(base_url: String, nickname: &str, password: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.login(nickname, password).await;
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "Login of {} failed: {:?}",
            nickname,
            response.text().await
        );

        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Home
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /auth/signup
    pub async fn signup(&self, nickname: &str, password: &str) -> Response {
        self.client
            .post(self.url("/auth/signup"))
            .json(&json!({ "nickname": nickname, "password": password }))
            .send()
            .await
            .expect("Signup request failed")
    }

    /// POST /auth/login
    pub async fn login(&self, nickname: &str, password: &str) -> Response {
        self.client
            .post(self.url("/auth/login"))
            .json(&json!({ "nickname": nickname, "password": password }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// POST /auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .post(self.url("/auth/logout"))
            .send()
            .await
            .expect("Logout request failed")
    }

    /// POST /auth/nickname
    pub async fn change_nickname(&self, nickname: &str) -> Response {
        self.client
            .post(self.url("/auth/nickname"))
            .json(&json!({ "nickname": nickname }))
            .send()
            .await
            .expect("Change nickname request failed")
    }

    // ========================================================================
    // Track Endpoints
    // ========================================================================

    /// GET /api/tracks
    pub async fn list_tracks(&self, query: Option<&str>, filter: Option<&str>) -> Response {
        let mut params = Vec::new();
        if let Some(query) = query {
            params.push(("q", query));
        }
        if let Some(filter) = filter {
            params.push(("filter", filter));
        }
        self.client
            .get(self.url("/api/tracks"))
            .query(&params)
            .send()
            .await
            .expect("List tracks request failed")
    }

    /// GET /api/tracks, decoded
    pub async fn listing(&self, query: Option<&str>, filter: Option<&str>) -> Value {
        let response = self.list_tracks(query, filter).await;
        assert_eq!(response.status(), StatusCode::OK);
        response.json().await.expect("Invalid listing body")
    }

    /// POST /tracks/upload
    pub async fn upload_track(&self, title: &str, artist: &str, file_name: &str) -> Response {
        let form = Form::new()
            .text("title", title.to_string())
            .text("artist", artist.to_string())
            .part(
                "file",
                Part::bytes(FAKE_MP3_BYTES.to_vec()).file_name(file_name.to_string()),
            );
        self.client
            .post(self.url("/tracks/upload"))
            .multipart(form)
            .send()
            .await
            .expect("Upload request failed")
    }

    /// Uploads a track and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if the upload is not accepted.
    pub async fn upload_ok(&self, title: &str) -> usize {
        let response = self.upload_track(title, "", "song.mp3").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.expect("Invalid upload body");
        body["id"].as_u64().expect("Missing track id") as usize
    }

    /// POST /tracks/{id}/like
    pub async fn like_track(&self, track_id: usize) -> Response {
        self.client
            .post(self.url(&format!("/tracks/{}/like", track_id)))
            .send()
            .await
            .expect("Like request failed")
    }

    /// POST /tracks/{id}/unlike
    pub async fn unlike_track(&self, track_id: usize) -> Response {
        self.client
            .post(self.url(&format!("/tracks/{}/unlike", track_id)))
            .send()
            .await
            .expect("Unlike request failed")
    }

    /// POST /tracks/{id}/play
    pub async fn play_track(&self, track_id: usize) -> Response {
        self.client
            .post(self.url(&format!("/tracks/{}/play", track_id)))
            .send()
            .await
            .expect("Play request failed")
    }

    /// POST /tracks/{id}/update
    pub async fn update_track(&self, track_id: usize, title: &str, artist: &str) -> Response {
        self.client
            .post(self.url(&format!("/tracks/{}/update", track_id)))
            .json(&json!({ "title": title, "artist": artist }))
            .send()
            .await
            .expect("Update request failed")
    }

    /// POST /tracks/{id}/delete
    pub async fn delete_track(&self, track_id: usize) -> Response {
        self.client
            .post(self.url(&format!("/tracks/{}/delete", track_id)))
            .send()
            .await
            .expect("Delete request failed")
    }

    /// GET of a public file path such as a track's `file_url`
    pub async fn get_path(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("File request failed")
    }

    // ========================================================================
    // Profile Endpoints
    // ========================================================================

    /// GET /api/profiles?q=
    pub async fn search_profiles(&self, query: &str) -> Response {
        self.client
            .get(self.url("/api/profiles"))
            .query(&[("q", query)])
            .send()
            .await
            .expect("Profile search request failed")
    }

    /// GET /api/profiles/{nickname}
    pub async fn get_profile(&self, nickname: &str) -> Response {
        self.client
            .get(self.url(&format!("/api/profiles/{}", nickname)))
            .send()
            .await
            .expect("Profile request failed")
    }

    /// GET /api/profiles/me
    pub async fn get_my_profile(&self) -> Response {
        self.client
            .get(self.url("/api/profiles/me"))
            .send()
            .await
            .expect("My profile request failed")
    }
}
