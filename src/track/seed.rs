use super::track_models::{validate_title, NewTrack};
use crate::store::{FullStore, UserStore};
use crate::user::{User, PLATFORM_NICKNAME};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

pub const PLATFORM_DIR: &str = "platform";

/// Makes sure the password-less platform account exists.
pub fn ensure_platform_user<S: UserStore + ?Sized>(store: &S) -> Result<User> {
    if let Some(user) = store.get_user_by_nickname(PLATFORM_NICKNAME)? {
        return Ok(user);
    }
    let user = store.create_user(PLATFORM_NICKNAME, None)?;
    info!("Created platform account {}", user.id);
    Ok(user)
}

/// Registers every `*.mp3` in `<upload_dir>/platform/` as a platform track,
/// skipping files already registered and files whose name is not a valid
/// title. Returns how many tracks were created.
pub fn seed_platform_tracks<S: FullStore + ?Sized>(store: &S, upload_dir: &Path) -> Result<usize> {
    let platform_user = ensure_platform_user(store)?;

    let platform_dir = upload_dir.join(PLATFORM_DIR);
    if !platform_dir.is_dir() {
        debug!("No platform directory at {:?}", platform_dir);
        return Ok(0);
    }

    let mut files: Vec<_> = std::fs::read_dir(&platform_dir)
        .with_context(|| format!("Failed to read {:?}", platform_dir))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "mp3"))
        .collect();
    files.sort();

    let mut created = 0;
    for path in files {
        let (Some(file_name), Some(stem)) = (
            path.file_name().and_then(|n| n.to_str()),
            path.file_stem().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        let filename = format!("{}/{}", PLATFORM_DIR, file_name);
        if store.get_track_by_filename(&filename)?.is_some() {
            continue;
        }
        if let Err(err) = validate_title(stem) {
            warn!("Skipping platform file {:?}: {}", path, err);
            continue;
        }
        store.create_track(&NewTrack {
            title: stem.to_string(),
            artist: String::new(),
            filename,
            creator_id: platform_user.id,
            is_platform: true,
        })?;
        created += 1;
    }

    info!("Seeded {} platform tracks", created);
    Ok(created)
}
