use crate::error::CoreResult;
use std::path::{Path, PathBuf};
use tracing::debug;

/// URL prefix under which the upload directory is served.
pub const PUBLIC_UPLOADS_PATH: &str = "/static/uploads";

const DEFAULT_EXTENSION: &str = "mp3";
const MAX_EXTENSION_CHARS: usize = 10;

/// Public retrieval path of a stored file.
pub fn public_path(filename: &str) -> String {
    format!("{}/{}", PUBLIC_UPLOADS_PATH, filename)
}

/// Keeps the extension of the client-provided name when it is a plain
/// alphanumeric one, `mp3` otherwise.
fn stored_extension(original_name: Option<&str>) -> String {
    original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_CHARS
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or(DEFAULT_EXTENSION)
        .to_string()
}

/// Uploaded audio files, stored flat under one directory with random names.
/// Contents are not inspected.
#[derive(Debug, Clone)]
pub struct FileStorage {
    upload_dir: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(upload_dir: P) -> Self {
        FileStorage {
            upload_dir: upload_dir.as_ref().to_path_buf(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Writes `bytes` under a fresh unique name and returns that name.
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> CoreResult<String> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let filename = format!(
            "{}.{}",
            uuid::Uuid::new_v4().simple(),
            stored_extension(original_name)
        );
        tokio::fs::write(self.upload_dir.join(&filename), bytes).await?;
        debug!("Stored {} bytes as {}", bytes.len(), filename);
        Ok(filename)
    }

    /// Best effort removal of a stored file.
    pub async fn remove(&self, filename: &str) {
        if let Err(err) = tokio::fs::remove_file(self.upload_dir.join(filename)).await {
            debug!("Could not remove stored file {}: {}", filename, err);
        }
    }
}
