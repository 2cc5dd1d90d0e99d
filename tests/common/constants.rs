//! Shared constants for end-to-end tests
//!
//! When fixture users or seeded platform files change, update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user nickname
pub const TEST_USER: &str = "alice";

/// Regular test user password
pub const TEST_PASS: &str = "alicepass123";

/// Second user, used for ownership and cross-user checks
pub const OTHER_USER: &str = "bob_the_listener";

/// Second user password
pub const OTHER_PASS: &str = "bobpass123";

// ============================================================================
// Seeded Platform Content
// ============================================================================

/// Files placed in `<upload_dir>/platform/` before seeding, in name order
pub const PLATFORM_FILES: &[&str] = &["Morning Light.mp3", "Night Drive.mp3"];

/// Titles the seeded platform tracks get (file stems)
pub const PLATFORM_TITLES: &[&str] = &["Morning Light", "Night Drive"];

/// Nickname of the reserved platform account
pub const PLATFORM_USER: &str = "Platform";

// ============================================================================
// Server Settings
// ============================================================================

pub const SESSION_COOKIE_NAME: &str = "music_session";

pub const TEST_SECRET_KEY: &str = "e2e-test-secret";

/// Audio payload used for uploads; content is never inspected
pub const FAKE_MP3_BYTES: &[u8] = b"ID3\x03\x00\x00\x00\x00\x00\x00fake audio";

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
