use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings read from the optional TOML file. Every key is optional and wins
/// over the command line when present.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub upload_dir: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub secret_key: Option<String>,
    pub session_cookie_name: Option<String>,
    pub session_max_age_days: Option<u32>,
    pub seed_platform: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
