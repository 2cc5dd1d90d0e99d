use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use music_platform_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_PORT};
use music_platform_server::server::config::DEFAULT_SESSION_MAX_AGE_DAYS;
use music_platform_server::track::{seed, FileStorage};
use music_platform_server::user::SessionTokenCodec;
use music_platform_server::{run_server, RequestsLoggingLevel, ServerState, SqliteStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite database file, created if missing.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory where uploaded audio files are stored.
    #[clap(long, value_parser = parse_path)]
    pub upload_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Key used to sign session cookies.
    #[clap(long, env = "MUSIC_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Name of the session cookie.
    #[clap(long)]
    pub session_cookie_name: Option<String>,

    /// Lifetime of a session in days.
    #[clap(long, default_value_t = DEFAULT_SESSION_MAX_AGE_DAYS)]
    pub session_max_age_days: u32,

    /// Skip creating the platform account and its tracks at startup.
    #[clap(long)]
    pub no_seed: bool,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            upload_dir: self.upload_dir.clone(),
            port: self.port,
            logging_level: self.logging_level,
            secret_key: self.secret_key.clone(),
            session_cookie_name: self.session_cookie_name.clone(),
            session_max_age_days: self.session_max_age_days,
            seed_platform: !self.no_seed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;
    info!("Resolved configuration: {:?}", config);

    info!("Opening SQLite database at {:?}...", config.db_path);
    let store = SqliteStore::new(&config.db_path)?;

    std::fs::create_dir_all(&config.upload_dir)
        .with_context(|| format!("Failed to create upload dir {:?}", config.upload_dir))?;

    if config.seed_platform {
        let session = store.open_session()?;
        seed::seed_platform_tracks(&session, &config.upload_dir)?;
    }

    let session_codec = SessionTokenCodec::new(&config.secret_key, config.session_max_age())?;
    let state = ServerState::new(
        config.server_config(),
        store,
        FileStorage::new(&config.upload_dir),
        session_codec,
    );

    info!("Ready to serve at port {}!", config.port);
    run_server(state).await
}
