//! Test fixture creation
//!
//! Builds the temporary database and upload directory a test server runs on.

use super::constants::*;
use anyhow::Result;
use music_platform_server::track::seed::{seed_platform_tracks, PLATFORM_DIR};
use music_platform_server::user::UserManager;
use music_platform_server::SqliteStore;
use std::path::PathBuf;
use tempfile::TempDir;

/// Paths of a freshly built fixture, all inside the returned `TempDir`.
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
}

/// Creates the database with the two test users and the seeded platform
/// tracks, plus the upload directory holding the platform files.
pub fn create_test_fixture() -> Result<TestFixture> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("music.db");
    let upload_dir = temp_dir.path().join("uploads");

    let platform_dir = upload_dir.join(PLATFORM_DIR);
    std::fs::create_dir_all(&platform_dir)?;
    for file_name in PLATFORM_FILES {
        std::fs::write(platform_dir.join(file_name), FAKE_MP3_BYTES)?;
    }

    let store = SqliteStore::new(&db_path)?;
    let session = store.open_session()?;
    let users = UserManager::new(&session);
    users.signup(TEST_USER, TEST_PASS)?;
    users.signup(OTHER_USER, OTHER_PASS)?;
    seed_platform_tracks(&session, &upload_dir)?;

    Ok(TestFixture {
        temp_dir,
        db_path,
        upload_dir,
    })
}
