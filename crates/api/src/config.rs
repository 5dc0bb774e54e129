use std::path::PathBuf;
use std::str::FromStr;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite connection URL (default: `sqlite://sheltered.db`).
    pub database_url: String,
    /// Directory uploaded images are written to (default: `images`).
    pub image_directory: PathBuf,
    /// Largest accepted image upload body, in bytes (default: 10 MiB).
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | `sqlite://sheltered.db`    |
    /// | `IMAGE_DIRECTORY`      | `images`                   |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`                 |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Panics on unparseable numeric values; misconfiguration should fail
    /// fast at startup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: var("HOST", "0.0.0.0"),
            port: parse(&var("PORT", "3000"), "PORT"),
            cors_origins,
            request_timeout_secs: parse(&var("REQUEST_TIMEOUT_SECS", "30"), "REQUEST_TIMEOUT_SECS"),
            database_url: var("DATABASE_URL", "sqlite://sheltered.db"),
            image_directory: PathBuf::from(var("IMAGE_DIRECTORY", "images")),
            max_upload_bytes: parse(&var("MAX_UPLOAD_BYTES", "10485760"), "MAX_UPLOAD_BYTES"),
        }
    }
}

fn parse<T: FromStr>(value: &str, key: &str) -> T {
    value
        .trim()
        .parse()
        .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>()))
}
