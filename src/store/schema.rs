//! Table declarations for the music platform database.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};
use anyhow::Result;
use rusqlite::Connection;

const USER_FOREIGN_KEY_CASCADE: ForeignKey = ForeignKey {
    foreign_table: "user",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const USER_FOREIGN_KEY_SET_NULL: ForeignKey = ForeignKey {
    foreign_table: "user",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::SetNull,
};

const TRACK_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "track",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

pub const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("nickname", &SqlType::Text, non_null = true),
        // NULL for accounts that can never log in, such as the platform account.
        sqlite_column!("password_hash", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    composite_primary_key: &[],
    indices: &[],
    unique_constraints: &[&["nickname"]],
};

pub const TRACK_TABLE_V_0: Table = Table {
    name: "track",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!(
            "artist",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!("filename", &SqlType::Text, non_null = true),
        sqlite_column!(
            "creator_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FOREIGN_KEY_CASCADE)
        ),
        sqlite_column!(
            "is_platform",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    composite_primary_key: &[],
    indices: &[("idx_track_creator_id", "creator_id")],
    unique_constraints: &[],
};

pub const FAVORITE_TABLE_V_0: Table = Table {
    name: "favorite",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FOREIGN_KEY_CASCADE)
        ),
        sqlite_column!(
            "track_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&TRACK_FOREIGN_KEY)
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    composite_primary_key: &["user_id", "track_id"],
    indices: &[],
    unique_constraints: &[],
};

pub const PLAY_TABLE_V_0: Table = Table {
    name: "play",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "track_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&TRACK_FOREIGN_KEY)
        ),
        // Anonymous plays have no user.
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            foreign_key = Some(&USER_FOREIGN_KEY_SET_NULL)
        ),
        sqlite_column!(
            "played_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    composite_primary_key: &[],
    indices: &[],
    unique_constraints: &[],
};

pub const TRACK_TABLE_V_1: Table = Table {
    indices: &[
        ("idx_track_creator_id", "creator_id"),
        ("idx_track_created", "created"),
    ],
    ..TRACK_TABLE_V_0
};

pub const FAVORITE_TABLE_V_1: Table = Table {
    indices: &[("idx_favorite_track_id", "track_id")],
    ..FAVORITE_TABLE_V_0
};

pub const PLAY_TABLE_V_1: Table = Table {
    indices: &[("idx_play_track_id", "track_id")],
    ..PLAY_TABLE_V_0
};

fn migrate_from_0_to_1(conn: &Connection) -> Result<()> {
    TRACK_TABLE_V_1.create_indices(conn)?;
    FAVORITE_TABLE_V_1.create_indices(conn)?;
    PLAY_TABLE_V_1.create_indices(conn)?;
    Ok(())
}

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[
            USER_TABLE_V_0,
            TRACK_TABLE_V_0,
            FAVORITE_TABLE_V_0,
            PLAY_TABLE_V_0,
        ],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[
            USER_TABLE_V_0,
            TRACK_TABLE_V_1,
            FAVORITE_TABLE_V_1,
            PLAY_TABLE_V_1,
        ],
        migration: Some(migrate_from_0_to_1),
    },
];
