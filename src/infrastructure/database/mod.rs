pub mod error_codes;
pub mod executor;
pub mod migrator;
pub mod repositories;
pub mod schema;

pub use executor::{QueryExecutor, Row};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::Deserialize;
use tracing::info;

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./identity.db?mode=rwc")
    pub url: String,
    /// Upper bound of pooled connections.
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds to wait for a free pooled connection.
    pub acquire_timeout_secs: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./identity.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: None,
        }
    }
}

impl DatabaseConfig {
    /// Single-connection in-memory SQLite. Every pooled connection to
    /// `sqlite::memory:` opens its own database, so the pool is pinned to one.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_secs: None,
        }
    }
}

/// Open the connection pool.
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!(
        max_connections = config.max_connections,
        "Connecting to database: {}", config.url
    );

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    if let Some(secs) = config.acquire_timeout_secs {
        options.acquire_timeout(Duration::from_secs(secs));
    }

    let db = Database::connect(options).await?;
    info!("Database connected successfully");
    Ok(db)
}
