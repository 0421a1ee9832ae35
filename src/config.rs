//! Configuration module
//!
//! Loaded from a TOML file (`~/.config/tenant-identity/config.toml` by
//! default). Every section and key is optional; `DATABASE_URL` overrides
//! `database.url`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::crypto::password::{DEFAULT_COST, MIN_COST};
use crate::infrastructure::DatabaseConfig;
use crate::support::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

const APP_DIR: &str = "tenant-identity";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
    /// `"pretty"` or `"json"`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// bcrypt cost factor for stored passwords.
    pub password_hash_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            password_hash_cost: DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    pub timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub pagination: PaginationConfig,
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// Read the file at `path`, falling back to defaults when it does not
    /// exist, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be ≥ 1".into()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.pagination.max_page_size) {
            return Err(ConfigError::Invalid(format!(
                "pagination.max_page_size must be 1–{MAX_PAGE_SIZE}"
            )));
        }
        if !(1..=self.pagination.max_page_size).contains(&self.pagination.default_page_size) {
            return Err(ConfigError::Invalid(
                "pagination.default_page_size must be between 1 and max_page_size".into(),
            ));
        }
        if !(MIN_COST..=31).contains(&self.security.password_hash_cost) {
            return Err(ConfigError::Invalid(format!(
                "security.password_hash_cost must be {MIN_COST}–31"
            )));
        }
        Ok(())
    }
}

/// `~/.config/tenant-identity/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join(APP_DIR).join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}
