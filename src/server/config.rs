use super::RequestsLoggingLevel;

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "music_session";
pub const DEFAULT_SESSION_MAX_AGE_DAYS: u32 = 7;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub session_cookie_name: String,
    /// Lifetime of the session cookie and of the token inside it.
    pub session_max_age_days: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            session_max_age_days: DEFAULT_SESSION_MAX_AGE_DAYS,
        }
    }
}
