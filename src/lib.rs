//! Music platform server library
//!
//! This library exposes the internal modules for testing and for the server binary.

pub mod config;
pub mod error;
pub mod server;
pub mod sqlite_persistence;
pub mod store;
pub mod track;
pub mod user;

// Re-export commonly used types for convenience
pub use error::{CoreError, CoreResult};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerState};
pub use store::SqliteStore;
