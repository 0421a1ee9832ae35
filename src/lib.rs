//! # Tenant identity
//!
//! Multi-tenant user identity records: create, look up, list, partially
//! update and confirm credentials, with every read and write scoped to the
//! caller's tenant.
//!
//! ## Architecture
//!
//! - **domain**: the user aggregate, input DTOs and the repository port
//! - **application**: `UserService`, the use-case orchestration
//! - **infrastructure**: connection pool, query executor, migrations,
//!   SQL repository, password hashing
//! - **support**: error taxonomy, column-name codec, pagination, shutdown
//!
//! Tenant authentication is the caller's job: every operation takes an
//! already-authenticated tenant string and uses it verbatim as a filter.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod server;
pub mod support;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, QueryExecutor};

pub use server::{init_tracing, ServiceHandle, ServiceOptions};
