use axum::extract::FromRef;

use crate::store::SqliteStore;
use crate::track::FileStorage;
use crate::user::SessionTokenCodec;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedStore = Arc<SqliteStore>;
pub type GuardedFileStorage = Arc<FileStorage>;
pub type GuardedSessionCodec = Arc<SessionTokenCodec>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: GuardedStore,
    pub file_storage: GuardedFileStorage,
    pub session_codec: GuardedSessionCodec,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        store: SqliteStore,
        file_storage: FileStorage,
        session_codec: SessionTokenCodec,
    ) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            store: Arc::new(store),
            file_storage: Arc::new(file_storage),
            session_codec: Arc::new(session_codec),
        }
    }
}

impl FromRef<ServerState> for GuardedStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for GuardedFileStorage {
    fn from_ref(input: &ServerState) -> Self {
        input.file_storage.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
