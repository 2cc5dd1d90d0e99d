//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own database and upload directory.

use super::constants::*;
use super::fixtures::{create_test_fixture, TestFixture};
use music_platform_server::server::{make_app, RequestsLoggingLevel, ServerConfig, ServerState};
use music_platform_server::track::FileStorage;
use music_platform_server::user::SessionTokenCodec;
use music_platform_server::SqliteStore;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance with isolated database and upload directory
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store on the same database, for direct inspection in tests
    pub store: SqliteStore,

    /// Where uploaded files land
    pub upload_dir: PathBuf,

    // Private fields - keep resources alive until drop
    _fixture: TestFixture,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the fixture cannot be created, the port cannot be bound or
    /// the server doesn't become ready within the timeout.
    pub async fn spawn() -> Self {
        let fixture = create_test_fixture().expect("Failed to create test fixture");

        let store = SqliteStore::new(&fixture.db_path).expect("Failed to open store");
        let file_storage = FileStorage::new(&fixture.upload_dir);
        let session_codec = SessionTokenCodec::new(TEST_SECRET_KEY, chrono::Duration::days(7))
            .expect("Failed to build session codec");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            session_cookie_name: SESSION_COOKIE_NAME.to_string(),
            session_max_age_days: 7,
        };
        let app = make_app(ServerState::new(
            config,
            store.clone(),
            file_storage,
            session_codec,
        ));

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            upload_dir: fixture.upload_dir.clone(),
            _fixture: fixture,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
