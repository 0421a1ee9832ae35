//! Service bootstrap
//!
//! Wires configuration, the connection pool, the repository and the user
//! service together. The pool is opened here, owned by the
//! [`QueryExecutor`], and closed through [`ServiceHandle::shutdown`].

use std::sync::Arc;

use tracing::info;

use crate::application::UserService;
use crate::config::{AppConfig, LoggingConfig};
use crate::infrastructure::database::repositories::UserRepository;
use crate::infrastructure::{init_database, QueryExecutor};
use crate::support::shutdown::{wait_for_shutdown_signal, ShutdownCoordinator};
use crate::support::PersistenceError;

/// Options for [`ServiceHandle::start`].
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// A running service: pool, repository and user service.
pub struct ServiceHandle {
    pub users: UserService<UserRepository>,
    pub config: AppConfig,
    executor: Arc<QueryExecutor>,
}

impl ServiceHandle {
    pub async fn start(opts: ServiceOptions) -> Result<Self, PersistenceError> {
        let config = opts.config;

        let db = init_database(&config.database)
            .await
            .map_err(|e| PersistenceError::new(e, None))?;
        let executor = Arc::new(QueryExecutor::new(db));

        if opts.auto_migrate {
            executor.migrate().await?;
        }

        let repo = Arc::new(UserRepository::new(executor.clone()));
        let users = UserService::new(repo, config.security.password_hash_cost);

        info!("Identity service ready");
        Ok(Self {
            users,
            config,
            executor,
        })
    }

    /// Block until SIGINT/SIGTERM, then close the pool within the
    /// configured shutdown timeout.
    pub async fn run_until_shutdown(self) -> std::io::Result<()> {
        wait_for_shutdown_signal().await?;
        let coordinator = ShutdownCoordinator::new(self.config.shutdown.timeout_secs);
        coordinator.run_cleanup(|| self.shutdown()).await;
        Ok(())
    }

    /// Drain and close the connection pool.
    pub async fn shutdown(self) {
        if let Err(e) = self.executor.close().await {
            tracing::warn!(error = %e, "Failed to close database pool cleanly");
        }
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over
/// `logging.level`. Output goes to stderr so stdout stays machine-readable.
pub fn init_tracing(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    match config.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
