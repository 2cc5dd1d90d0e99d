//! End-to-end tests for authentication endpoints
//!
//! Tests signup, login, logout, nickname changes and session cookie handling.

mod common;

use common::{
    TestClient, TestServer, OTHER_USER, PLATFORM_USER, SESSION_COOKIE_NAME, TEST_PASS, TEST_USER,
};
use reqwest::StatusCode;
use serde_json::Value;

// ============================================================================
// Signup
// ============================================================================

#[tokio::test]
async fn test_signup_creates_user_and_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.signup("carol", "carolpass").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let set_cookie = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("Missing session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with(&format!("{}=", SESSION_COOKIE_NAME)));
    assert!(set_cookie.contains("HttpOnly"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["nickname"], "carol");

    // The new session is immediately usable
    let response = client.get_my_profile().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["nickname"], "carol");
}

#[tokio::test]
async fn test_signup_with_taken_nickname_conflicts() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.signup(TEST_USER, "whatever123").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_signup_validates_input() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(
        client.signup("ab", "longenough").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        client.signup("with space", "longenough").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        client.signup("dave", "123").await.status(),
        StatusCode::BAD_REQUEST
    );
}

// ============================================================================
// Login / Logout
// ============================================================================

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_USER, TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.home().await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["nickname"], TEST_USER);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let wrong_password = client.login(TEST_USER, "wrong_password").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = wrong_password.json().await.unwrap();

    let unknown_user = client.login("nonexistent_user", "password").await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user: Value = unknown_user.json().await.unwrap();

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_platform_account_cannot_login() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(PLATFORM_USER, "platform").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.get_my_profile().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get_my_profile().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Session Cookie Handling
// ============================================================================

#[tokio::test]
async fn test_tampered_cookie_is_rejected_on_strict_routes() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .client
        .get(format!("{}/api/profiles/me", server.base_url))
        .header(
            reqwest::header::COOKIE,
            format!("{}=eyJ1c2VyX2lkIjoxLCJpYXQiOjB9.forged", SESSION_COOKIE_NAME),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_tampered_cookie_is_anonymous_on_lenient_routes() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .client
        .get(format!("{}/api/tracks", server.base_url))
        .header(
            reqwest::header::COOKIE,
            format!("{}=garbage", SESSION_COOKIE_NAME),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["liked_ids"], serde_json::json!([]));
}

// ============================================================================
// Nickname Changes
// ============================================================================

#[tokio::test]
async fn test_change_nickname() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.change_nickname("alice_renamed").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["nickname"], "alice_renamed");

    // Session keeps working, and the old nickname is free for login attempts
    let response = client.get_my_profile().await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["nickname"], "alice_renamed");

    let response = client.login("alice_renamed", TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = client.login(TEST_USER, TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_nickname_to_taken_conflicts() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.change_nickname(OTHER_USER).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client.get_my_profile().await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["nickname"], TEST_USER);
}

#[tokio::test]
async fn test_change_nickname_to_own_is_noop() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.change_nickname(TEST_USER).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_nickname_requires_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.change_nickname("someone").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
