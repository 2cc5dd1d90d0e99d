use super::schema::{
    FAVORITE_TABLE_V_1, PLAY_TABLE_V_1, TRACK_TABLE_V_1, USER_TABLE_V_0, VERSIONED_SCHEMAS,
};
use super::trait_def::{EngagementLookup, EngagementStore, TrackStore, UserStore};
use crate::error::{CoreError, CoreResult};
use crate::sqlite_persistence::open_versioned;
use crate::track::{NewTrack, Track, TrackCategory};
use crate::user::{User, UserCredentials};
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Location of the SQLite database. Holds no connection itself: every request
/// opens its own [`StoreSession`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `db_path`, validating and
    /// migrating its schema to the latest version.
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?;
        open_versioned(&conn, VERSIONED_SCHEMAS)
            .with_context(|| format!("Invalid database schema in {:?}", db_path))?;
        info!("Database ready at {:?}", db_path);
        Ok(SqliteStore { db_path })
    }

    pub fn open_session(&self) -> CoreResult<StoreSession> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(StoreSession { conn })
    }
}

/// A connection scoped to one unit of work. Dropping it closes the connection.
pub struct StoreSession {
    conn: Connection,
}

fn map_nickname_conflict(err: rusqlite::Error, nickname: &str) -> CoreError {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            CoreError::Conflict(format!("Nickname {} is already taken", nickname))
        }
        other => other.into(),
    }
}

/// `%query%` with LIKE wildcards in the query escaped by `\`.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Upper bound on bound parameters in one `IN (...)` list, well below
/// SQLite's variable limit.
const MAX_IDS_PER_STATEMENT: usize = 500;

/// Ids are INTEGER columns: anything beyond `i64::MAX` cannot be stored and
/// so matches no row.
fn sql_id(id: usize) -> Option<i64> {
    i64::try_from(id).ok()
}

fn sql_ids(ids: &[usize]) -> Vec<i64> {
    ids.iter().filter_map(|id| sql_id(*id)).collect()
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        nickname: row.get(1)?,
        created: row.get(2)?,
    })
}

const TRACK_COLUMNS: &str = "id, title, artist, filename, creator_id, is_platform, created";

fn track_from_row(row: &Row) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        filename: row.get(3)?,
        creator_id: row.get(4)?,
        is_platform: row.get(5)?,
        created: row.get(6)?,
    })
}

impl StoreSession {
    fn grouped_counts(
        &self,
        table: &str,
        track_ids: &[usize],
    ) -> CoreResult<HashMap<usize, u64>> {
        let mut counts = HashMap::new();
        for chunk in sql_ids(track_ids).chunks(MAX_IDS_PER_STATEMENT) {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT track_id, COUNT(*) FROM {} WHERE track_id IN ({}) GROUP BY track_id",
                table,
                placeholders(chunk.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok((row.get::<_, usize>(0)?, row.get::<_, i64>(1)? as u64))
            })?;
            for row in rows {
                let (track_id, count) = row?;
                counts.insert(track_id, count);
            }
        }
        Ok(counts)
    }
}

impl UserStore for StoreSession {
    fn create_user(&self, nickname: &str, password_hash: Option<&str>) -> CoreResult<User> {
        self.conn
            .query_row(
                &format!(
                    "INSERT INTO {} (nickname, password_hash) VALUES (?1, ?2) RETURNING id, nickname, created",
                    USER_TABLE_V_0.name
                ),
                params![nickname, password_hash],
                user_from_row,
            )
            .map_err(|err| map_nickname_conflict(err, nickname))
    }

    fn get_user(&self, user_id: usize) -> CoreResult<Option<User>> {
        let Some(user_id) = sql_id(user_id) else {
            return Ok(None);
        };
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT id, nickname, created FROM {} WHERE id = ?1",
                    USER_TABLE_V_0.name
                ),
                params![user_id],
                user_from_row,
            )
            .optional()?)
    }

    fn get_user_by_nickname(&self, nickname: &str) -> CoreResult<Option<User>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT id, nickname, created FROM {} WHERE nickname = ?1",
                    USER_TABLE_V_0.name
                ),
                params![nickname],
                user_from_row,
            )
            .optional()?)
    }

    fn get_user_credentials(&self, nickname: &str) -> CoreResult<Option<UserCredentials>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT id, password_hash FROM {} WHERE nickname = ?1",
                    USER_TABLE_V_0.name
                ),
                params![nickname],
                |row| {
                    Ok(UserCredentials {
                        user_id: row.get(0)?,
                        password_hash: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    fn rename_user(&self, user_id: usize, nickname: &str) -> CoreResult<()> {
        let Some(id) = sql_id(user_id) else {
            return Err(CoreError::not_found("User", user_id));
        };
        let updated = self
            .conn
            .execute(
                &format!("UPDATE {} SET nickname = ?1 WHERE id = ?2", USER_TABLE_V_0.name),
                params![nickname, id],
            )
            .map_err(|err| map_nickname_conflict(err, nickname))?;
        if updated == 0 {
            return Err(CoreError::not_found("User", user_id));
        }
        Ok(())
    }

    fn search_users(&self, query: &str, limit: usize) -> CoreResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, nickname, created FROM {} WHERE nickname LIKE ?1 ESCAPE '\\' ORDER BY nickname LIMIT ?2",
            USER_TABLE_V_0.name
        ))?;
        let users = stmt
            .query_map(params![like_pattern(query), limit], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

impl TrackStore for StoreSession {
    fn create_track(&self, track: &NewTrack) -> CoreResult<Track> {
        let created = self.conn.query_row(
            &format!(
                "INSERT INTO {} (title, artist, filename, creator_id, is_platform) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {}",
                TRACK_TABLE_V_1.name, TRACK_COLUMNS
            ),
            params![
                track.title,
                track.artist,
                track.filename,
                track.creator_id,
                track.is_platform
            ],
            track_from_row,
        )?;
        debug!("Created track {} ({})", created.id, created.filename);
        Ok(created)
    }

    fn get_track(&self, track_id: usize) -> CoreResult<Option<Track>> {
        let Some(track_id) = sql_id(track_id) else {
            return Ok(None);
        };
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    TRACK_COLUMNS, TRACK_TABLE_V_1.name
                ),
                params![track_id],
                track_from_row,
            )
            .optional()?)
    }

    fn get_track_by_filename(&self, filename: &str) -> CoreResult<Option<Track>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE filename = ?1 LIMIT 1",
                    TRACK_COLUMNS, TRACK_TABLE_V_1.name
                ),
                params![filename],
                track_from_row,
            )
            .optional()?)
    }

    fn update_track(&self, track_id: usize, title: &str, artist: &str) -> CoreResult<()> {
        let Some(id) = sql_id(track_id) else {
            return Err(CoreError::not_found("Track", track_id));
        };
        let updated = self.conn.execute(
            &format!(
                "UPDATE {} SET title = ?1, artist = ?2 WHERE id = ?3",
                TRACK_TABLE_V_1.name
            ),
            params![title, artist, id],
        )?;
        if updated == 0 {
            return Err(CoreError::not_found("Track", track_id));
        }
        Ok(())
    }

    fn delete_track(&self, track_id: usize) -> CoreResult<()> {
        let Some(id) = sql_id(track_id) else {
            return Err(CoreError::not_found("Track", track_id));
        };
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            &format!("DELETE FROM {} WHERE track_id = ?1", FAVORITE_TABLE_V_1.name),
            params![id],
        )?;
        tx.execute(
            &format!("DELETE FROM {} WHERE track_id = ?1", PLAY_TABLE_V_1.name),
            params![id],
        )?;
        let deleted = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", TRACK_TABLE_V_1.name),
            params![id],
        )?;
        if deleted == 0 {
            // Dropping the transaction rolls it back.
            return Err(CoreError::not_found("Track", track_id));
        }
        tx.commit()?;
        Ok(())
    }

    fn search_tracks(
        &self,
        query: Option<&str>,
        category: TrackCategory,
        limit: usize,
    ) -> CoreResult<Vec<Track>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<rusqlite::types::Value> = Vec::new();

        match category {
            TrackCategory::All => {}
            TrackCategory::User => conditions.push("is_platform = 0"),
            TrackCategory::Platform => conditions.push("is_platform = 1"),
        }
        if let Some(query) = query {
            conditions.push("title LIKE ? ESCAPE '\\'");
            values.push(like_pattern(query).into());
        }
        values.push((limit as i64).into());

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} {} ORDER BY created DESC, id DESC LIMIT ?",
            TRACK_COLUMNS, TRACK_TABLE_V_1.name, where_clause
        ))?;
        let tracks = stmt
            .query_map(params_from_iter(values.iter()), track_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tracks)
    }

    fn tracks_by_creator(&self, creator_id: usize) -> CoreResult<Vec<Track>> {
        let Some(creator_id) = sql_id(creator_id) else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM {} WHERE creator_id = ?1 ORDER BY created DESC, id DESC",
            TRACK_COLUMNS, TRACK_TABLE_V_1.name
        ))?;
        let tracks = stmt
            .query_map(params![creator_id], track_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tracks)
    }

    fn tracks_by_ids(&self, track_ids: &[usize]) -> CoreResult<Vec<Track>> {
        let mut by_id = HashMap::new();
        for chunk in sql_ids(track_ids).chunks(MAX_IDS_PER_STATEMENT) {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {} FROM {} WHERE id IN ({})",
                TRACK_COLUMNS,
                TRACK_TABLE_V_1.name,
                placeholders(chunk.len())
            ))?;
            for track in stmt.query_map(params_from_iter(chunk.iter()), track_from_row)? {
                let track = track?;
                by_id.insert(track.id, track);
            }
        }
        Ok(track_ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

impl EngagementStore for StoreSession {
    fn add_favorite(&self, user_id: usize, track_id: usize) -> CoreResult<bool> {
        let inserted = self.conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (user_id, track_id) VALUES (?1, ?2)",
                FAVORITE_TABLE_V_1.name
            ),
            params![user_id, track_id],
        )?;
        Ok(inserted > 0)
    }

    fn remove_favorite(&self, user_id: usize, track_id: usize) -> CoreResult<bool> {
        let deleted = self.conn.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1 AND track_id = ?2",
                FAVORITE_TABLE_V_1.name
            ),
            params![user_id, track_id],
        )?;
        Ok(deleted > 0)
    }

    fn favorite_track_ids(&self, user_id: usize) -> CoreResult<Vec<usize>> {
        let Some(user_id) = sql_id(user_id) else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT track_id FROM {} WHERE user_id = ?1 ORDER BY created DESC, rowid DESC",
            FAVORITE_TABLE_V_1.name
        ))?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<usize>, _>>()?;
        Ok(ids)
    }

    fn record_play(&self, track_id: usize, user_id: Option<usize>) -> CoreResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (track_id, user_id) VALUES (?1, ?2)",
                PLAY_TABLE_V_1.name
            ),
            params![track_id, user_id],
        )?;
        Ok(())
    }
}

impl EngagementLookup for StoreSession {
    fn like_counts(&self, track_ids: &[usize]) -> CoreResult<HashMap<usize, u64>> {
        self.grouped_counts(FAVORITE_TABLE_V_1.name, track_ids)
    }

    fn play_counts(&self, track_ids: &[usize]) -> CoreResult<HashMap<usize, u64>> {
        self.grouped_counts(PLAY_TABLE_V_1.name, track_ids)
    }

    fn creator_nicknames(&self, user_ids: &[usize]) -> CoreResult<HashMap<usize, String>> {
        let mut nicknames = HashMap::new();
        for chunk in sql_ids(user_ids).chunks(MAX_IDS_PER_STATEMENT) {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT id, nickname FROM {} WHERE id IN ({})",
                USER_TABLE_V_0.name,
                placeholders(chunk.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok((row.get::<_, usize>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (user_id, nickname) = row?;
                nicknames.insert(user_id, nickname);
            }
        }
        Ok(nicknames)
    }
}
