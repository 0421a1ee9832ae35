//! Tenant identity: operator CLI
//!
//! ```sh
//! # Validate config without touching the database
//! identity-service check
//!
//! # Keep the pool open until SIGINT/SIGTERM
//! identity-service serve
//!
//! # Manage users of one tenant
//! identity-service create --tenant acme --provider discord --provider-user-id 42 --username alice
//! identity-service list --tenant acme --page 2 --page-size 10
//! identity-service update --tenant acme --id <uuid> --clear-password
//! identity-service confirm --tenant acme --provider discord --provider-user-id 42 --password hunter22
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use validator::Validate;

use tenant_identity::domain::{
    ChangePasswordDto, ConfirmUserDto, CreateUserDto, Identity, ListUsersQuery, Patch,
    UpdateUserDto, UserKey, UserRole,
};
use tenant_identity::support::UserError;
use tenant_identity::{default_config_path, init_tracing, AppConfig, ServiceHandle, ServiceOptions};

/// Tenant-scoped user identity store.
#[derive(Parser, Debug)]
#[command(name = "identity-service", version, about = "Multi-tenant user identity records")]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "IDENTITY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// `migrate` always migrates; `--no-migrate` only affects other commands.
    fn runs_migrations(&self) -> bool {
        matches!(self.command, Command::Migrate) || !self.no_migrate
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and exit.
    Check,
    /// Apply database migrations and exit.
    Migrate,
    /// Hold the connection pool open until a shutdown signal arrives.
    Serve,
    /// Create a user.
    Create(CreateArgs),
    /// Fetch one user.
    Get(KeyedArgs),
    /// List users, newest first.
    List(ListArgs),
    /// Change username, password or role.
    Update(UpdateArgs),
    /// Set a new password.
    ChangePassword(PasswordArgs),
    /// Check a password.
    Confirm(PasswordArgs),
}

#[derive(Args, Debug)]
struct TenantArg {
    /// Tenant the operation is scoped to.
    #[arg(long, env = "IDENTITY_TENANT")]
    tenant: String,
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// Address the user by id.
    #[arg(long, conflicts_with_all = ["provider", "provider_user_id"])]
    id: Option<String>,
    /// Address the user by identity provider (with --provider-user-id).
    #[arg(long, requires = "provider_user_id")]
    provider: Option<String>,
    #[arg(long, requires = "provider")]
    provider_user_id: Option<String>,
}

impl KeyArgs {
    fn key(&self) -> Result<UserKey, String> {
        match (&self.id, &self.provider, &self.provider_user_id) {
            (Some(id), _, _) => Ok(UserKey::Id(id.clone())),
            (None, Some(provider), Some(provider_user_id)) => {
                Ok(UserKey::Identity(Identity::new(provider.clone(), provider_user_id.clone())))
            }
            _ => Err("either --id or --provider with --provider-user-id is required".into()),
        }
    }
}

#[derive(Args, Debug)]
struct KeyedArgs {
    #[command(flatten)]
    tenant: TenantArg,
    #[command(flatten)]
    key: KeyArgs,
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[command(flatten)]
    tenant: TenantArg,
    #[arg(long)]
    provider: String,
    #[arg(long)]
    provider_user_id: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    role: Option<UserRole>,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    tenant: TenantArg,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    page_size: Option<u32>,
    /// Only users with exactly this username.
    #[arg(long)]
    username: Option<String>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[command(flatten)]
    keyed: KeyedArgs,
    #[arg(long)]
    username: Option<String>,
    #[arg(long, conflicts_with = "clear_password")]
    password: Option<String>,
    /// Remove the stored password.
    #[arg(long)]
    clear_password: bool,
    #[arg(long)]
    role: Option<UserRole>,
}

#[derive(Args, Debug)]
struct PasswordArgs {
    #[command(flatten)]
    keyed: KeyedArgs,
    #[arg(long)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = AppConfig::load(&config_path)?;
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);
    info!("Configuration loaded from {}", config_path.display());

    if let Command::Check = cli.command {
        print_json(&serde_json::json!({
            "config": config_path.display().to_string(),
            "database": config.database.url,
            "maxConnections": config.database.max_connections,
            "maxPageSize": config.pagination.max_page_size,
            "logLevel": config.logging.level,
        }))?;
        return Ok(());
    }

    // ── Start service ──────────────────────────────────────────
    let handle = ServiceHandle::start(ServiceOptions {
        config,
        auto_migrate: cli.runs_migrations(),
    })
    .await?;

    let command = cli.command;
    if let Command::Serve = command {
        handle.run_until_shutdown().await?;
        return Ok(());
    }

    let result = run(&handle, command).await;
    handle.shutdown().await;

    match result {
        Ok(Some(output)) => print_json(&output)?,
        Ok(None) => {}
        Err(e) => {
            error!("{e}");
            return Err(e.into());
        }
    }
    Ok(())
}

/// Execute one command. Returns the JSON to print, if any.
async fn run(handle: &ServiceHandle, command: Command) -> Result<Option<serde_json::Value>, String> {
    let users = &handle.users;

    let output = match command {
        Command::Check | Command::Serve => return Ok(None),
        Command::Migrate => {
            info!("Schema is up to date");
            return Ok(None);
        }

        Command::Create(args) => {
            let dto = CreateUserDto {
                provider: args.provider,
                provider_user_id: args.provider_user_id,
                username: args.username,
                password: args.password,
                role: args.role,
            };
            dto.validate().map_err(|e| e.to_string())?;
            to_json(users.create(dto, &args.tenant.tenant).await.map_err(describe)?)
        }

        Command::Get(args) => {
            let key = args.key.key()?;
            to_json(users.get(&args.tenant.tenant, &key).await.map_err(describe)?)
        }

        Command::List(args) => {
            let query = ListUsersQuery {
                page: args.page,
                page_size: args.page_size,
                username: args.username,
            };
            query.validate().map_err(|e| e.to_string())?;
            let pagination = &handle.config.pagination;
            let page = query
                .page_request(pagination.default_page_size, pagination.max_page_size)
                .map_err(|e| e.to_string())?;
            to_json(
                users
                    .list(&args.tenant.tenant, page, query.username.as_deref())
                    .await
                    .map_err(describe)?,
            )
        }

        Command::Update(args) => {
            let key = args.keyed.key.key()?;
            let password = match (args.password, args.clear_password) {
                (_, true) => Patch::Null,
                (Some(password), false) => Patch::Value(password),
                (None, false) => Patch::Unset,
            };
            let dto = UpdateUserDto {
                username: args.username,
                password,
                role: args.role,
            };
            dto.validate().map_err(|e| e.to_string())?;
            to_json(
                users
                    .update(&args.keyed.tenant.tenant, &key, dto)
                    .await
                    .map_err(describe)?,
            )
        }

        Command::ChangePassword(args) => {
            let key = args.keyed.key.key()?;
            let dto = ChangePasswordDto {
                password: args.password,
            };
            dto.validate().map_err(|e| e.to_string())?;
            to_json(
                users
                    .change_password(&args.keyed.tenant.tenant, &key, dto.password)
                    .await
                    .map_err(describe)?,
            )
        }

        Command::Confirm(args) => {
            let key = args.keyed.key.key()?;
            let dto = ConfirmUserDto {
                password: args.password,
            };
            dto.validate().map_err(|e| e.to_string())?;
            to_json(
                users
                    .confirm(&args.keyed.tenant.tenant, &key, &dto.password)
                    .await
                    .map_err(describe)?,
            )
        }
    };

    output.map(Some)
}

/// Boundary mapping: conflict / not found / generic failure. The
/// persistence cause is logged, never shown.
fn describe(err: UserError) -> String {
    match err {
        UserError::AlreadyExists => "conflict: user already exists".to_string(),
        UserError::NotFound { key } => format!("not found: user {key}"),
        UserError::Persistence(e) => {
            error!(error = %e, code = ?e.code(), "Persistence failure");
            "internal error: persistence failure".to_string()
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

fn print_json(value: &impl Serialize) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("identity-service").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_migrate_ignores_no_migrate_flag() {
        assert!(parse(&["--no-migrate", "migrate"]).runs_migrations());
        assert!(parse(&["migrate"]).runs_migrations());
    }

    #[test]
    fn test_no_migrate_skips_other_commands() {
        assert!(!parse(&["--no-migrate", "serve"]).runs_migrations());
        assert!(parse(&["serve"]).runs_migrations());
    }
}
