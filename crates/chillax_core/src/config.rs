//! Application configuration resolved from `CHILLAX_*` environment variables.
//!
//! # Invariants
//! - Every setting has a default; only malformed values are errors.
//! - Lookup is injectable so tests never mutate the process environment.

use crate::logging::{default_log_level, normalize_level};
use crate::password::DEFAULT_HASH_ITERATIONS;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_REPOSITORY: &str = "CHILLAX_REPOSITORY";
pub const ENV_DATABASE_PATH: &str = "CHILLAX_DATABASE_PATH";
pub const ENV_DATA_DIR: &str = "CHILLAX_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "CHILLAX_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CHILLAX_LOG_DIR";
pub const ENV_HASH_ITERATIONS: &str = "CHILLAX_PASSWORD_HASH_ITERATIONS";

const DEFAULT_DB_FILE_NAME: &str = "chillax.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid value `{value}` for {key}; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

/// Storage backend selected for the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepositoryKind {
    /// In-memory repository, populated from data files at startup.
    #[default]
    Memory,
    /// SQLite repository, populated only when empty.
    Database,
}

impl FromStr for RepositoryKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "database" | "sqlite" => Ok(Self::Database),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_REPOSITORY,
                value: value.to_string(),
                expected: "memory|database",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub repository: RepositoryKind,
    pub database_path: PathBuf,
    /// Directory holding `movies.csv`, `users.csv` and `comments.csv`.
    pub data_dir: PathBuf,
    pub log_level: &'static str,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub password_hash_iterations: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryKind::default(),
            database_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            data_dir: bundled_data_dir(),
            log_level: default_log_level(),
            log_dir: None,
            password_hash_iterations: DEFAULT_HASH_ITERATIONS,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = get(ENV_REPOSITORY) {
            config.repository = value.parse()?;
        }
        if let Some(value) = get(ENV_DATABASE_PATH) {
            config.database_path = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&value).map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: value.clone(),
                expected: "trace|debug|info|warn|error",
            })?;
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_HASH_ITERATIONS) {
            config.password_hash_iterations = value
                .parse::<u32>()
                .ok()
                .filter(|iterations| *iterations > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_HASH_ITERATIONS,
                    value,
                    expected: "a positive integer",
                })?;
        }

        Ok(config)
    }
}

/// Sample catalog shipped with the crate.
pub fn bundled_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}
