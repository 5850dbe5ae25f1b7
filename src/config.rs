//! Application configuration.
//!
//! Every setting is resolved with priority: config.toml > environment
//! (including `.env`) > built-in default.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Defaults ====================

pub const DEFAULT_DATABASE_PATH: &str = "data/studydeck.db";
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// One week
pub const DEFAULT_SESSION_HOURS: i64 = 168;

/// Ten years
pub const MAX_SESSION_HOURS: i64 = 87_600;

/// Due cards returned when the client gives no `limit`
pub const DEFAULT_DUE_LIMIT: usize = 50;

/// Upper bound on a client-supplied `limit`
pub const MAX_DUE_LIMIT: usize = 500;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not parse config.toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

// ==================== File layout ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<ServerSection>,
    database: Option<DatabaseSection>,
    auth: Option<AuthSection>,
    study: Option<StudySection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthSection {
    session_hours: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct StudySection {
    default_due_limit: Option<usize>,
    max_due_limit: Option<usize>,
}

// ==================== Resolved configuration ====================

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server_addr: String,
    pub server_port: u16,
    pub database_path: PathBuf,
    pub session_hours: i64,
    pub default_due_limit: usize,
    pub max_due_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            session_hours: DEFAULT_SESSION_HOURS,
            default_due_limit: DEFAULT_DUE_LIMIT,
            max_due_limit: MAX_DUE_LIMIT,
        }
    }
}

impl Config {
    /// Load from `config.toml` in the working directory and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let contents = std::fs::read_to_string(CONFIG_FILE).ok();
        if contents.is_some() {
            tracing::info!("Using settings from {}", CONFIG_FILE);
        }
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolve from an optional config file body and an environment lookup
    pub fn from_sources(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: FileConfig = match file {
            Some(contents) => toml::from_str(contents)?,
            None => FileConfig::default(),
        };
        let server = file.server.unwrap_or_default();
        let database = file.database.unwrap_or_default();
        let auth = file.auth.unwrap_or_default();
        let study = file.study.unwrap_or_default();
        let defaults = Config::default();

        let server_port = match server.port {
            Some(port) => port,
            None => parse_env(&env, "SERVER_PORT")?.unwrap_or(defaults.server_port),
        };
        let session_hours = match auth.session_hours {
            Some(hours) => hours,
            None => parse_env(&env, "SESSION_HOURS")?.unwrap_or(defaults.session_hours),
        };
        if !(1..=MAX_SESSION_HOURS).contains(&session_hours) {
            return Err(ConfigError::InvalidValue {
                key: "session_hours",
                value: session_hours.to_string(),
            });
        }

        let max_due_limit = study.max_due_limit.unwrap_or(defaults.max_due_limit);
        let default_due_limit = study.default_due_limit.unwrap_or(defaults.default_due_limit);
        if max_due_limit == 0 || default_due_limit == 0 || default_due_limit > max_due_limit {
            return Err(ConfigError::InvalidValue {
                key: "default_due_limit",
                value: format!("{} (max {})", default_due_limit, max_due_limit),
            });
        }

        Ok(Self {
            server_addr: server
                .addr
                .or_else(|| env("SERVER_ADDR"))
                .unwrap_or(defaults.server_addr),
            server_port,
            database_path: database
                .path
                .or_else(|| env("DATABASE_PATH"))
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            session_hours,
            default_due_limit,
            max_due_limit,
        })
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }

    /// Cap a client-requested due limit at `max_due_limit`; zero stays zero
    pub fn due_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_due_limit)
            .min(self.max_due_limit)
    }
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
