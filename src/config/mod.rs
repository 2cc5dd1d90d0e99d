mod file_config;

pub use file_config::FileConfig;

use crate::server::config::{DEFAULT_SESSION_COOKIE_NAME, DEFAULT_SESSION_MAX_AGE_DAYS};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";
pub const DEFAULT_SECRET_KEY: &str = "change-me";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub secret_key: Option<String>,
    pub session_cookie_name: Option<String>,
    pub session_max_age_days: u32,
    pub seed_platform: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            db_path: None,
            upload_dir: None,
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::default(),
            secret_key: None,
            session_cookie_name: None,
            session_max_age_days: DEFAULT_SESSION_MAX_AGE_DAYS,
            seed_platform: true,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub secret_key: String,
    pub session_cookie_name: String,
    pub session_max_age_days: u32,
    pub seed_platform: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("db_path", &self.db_path)
            .field("upload_dir", &self.upload_dir)
            .field("port", &self.port)
            .field("logging_level", &self.logging_level)
            .field("secret_key", &"<redacted>")
            .field("session_cookie_name", &self.session_cookie_name)
            .field("session_max_age_days", &self.session_max_age_days)
            .field("seed_platform", &self.seed_platform)
            .finish()
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified on the command line or in config file")
            })?;
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let upload_dir = file
            .upload_dir
            .map(PathBuf::from)
            .or_else(|| cli.upload_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(level) => parse_logging_level(&level)
                .ok_or_else(|| anyhow::anyhow!("Invalid logging_level: {}", level))?,
            None => cli.logging_level,
        };

        let secret_key = match file.secret_key.or_else(|| cli.secret_key.clone()) {
            Some(key) if key.is_empty() => bail!("secret_key must not be empty"),
            Some(key) => key,
            None => {
                warn!("No secret key configured, session cookies are signed with the default key.");
                DEFAULT_SECRET_KEY.to_string()
            }
        };

        let session_cookie_name = file
            .session_cookie_name
            .or_else(|| cli.session_cookie_name.clone())
            .unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string());

        let session_max_age_days = file
            .session_max_age_days
            .unwrap_or(cli.session_max_age_days);
        if session_max_age_days == 0 {
            bail!("session_max_age_days must be at least 1");
        }

        let seed_platform = file.seed_platform.unwrap_or(cli.seed_platform);

        Ok(Self {
            db_path,
            upload_dir,
            port,
            logging_level,
            secret_key,
            session_cookie_name,
            session_max_age_days,
            seed_platform,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level,
            port: self.port,
            session_cookie_name: self.session_cookie_name.clone(),
            session_max_age_days: self.session_max_age_days,
        }
    }

    pub fn session_max_age(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_max_age_days as i64)
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
