//! Configuration module for the KTravel backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Password accepted while no admin credential has been stored.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// sqlx SQLite URL; when unset the flat-file backend is used
    pub database_url: Option<String>,
    /// Directory holding the flat-file fallback documents
    pub data_dir: PathBuf,
    /// Directory uploaded images are written to
    pub upload_dir: PathBuf,
    /// Legacy admin password, used until a credential is stored
    pub admin_password: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format
    pub log_json: bool,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url = env::var("KTRAVEL_DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let data_dir = env::var("KTRAVEL_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let upload_dir = env::var("KTRAVEL_UPLOAD_DIR")
            .unwrap_or_else(|_| "./public/uploads".to_string())
            .into();

        // An empty ADMIN_PASSWORD means "not set"
        let admin_password = env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());

        let raw_bind = env::var("KTRAVEL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
        let bind_addr = raw_bind.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw_bind, "Invalid KTRAVEL_BIND_ADDR, using default");
            default_bind_addr()
        });

        let log_level = env::var("KTRAVEL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_json = env_flag("KTRAVEL_LOG_JSON");
        let secure_cookies = env_flag("KTRAVEL_SECURE_COOKIES");

        Self {
            database_url,
            data_dir,
            upload_dir,
            admin_password,
            bind_addr,
            log_level,
            log_json,
            secure_cookies,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
