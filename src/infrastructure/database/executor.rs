//! Query executor
//!
//! Owns the connection pool. Every call is exactly one round trip; failures
//! come back as [`PersistenceError`] carrying the driver's vendor code, and
//! every returned row has had its column names converted to camelCase.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, JsonValue, RuntimeErr,
    Statement,
};
use sea_orm_migration::MigratorTrait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::migrator::Migrator;
use crate::support::case::row_to_internal;
use crate::support::PersistenceError;

/// One result row keyed by camelCase column name.
pub type Row = Map<String, Value>;

pub struct QueryExecutor {
    db: DatabaseConnection,
}

impl QueryExecutor {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), PersistenceError> {
        info!("Running database migrations...");
        Migrator::up(&self.db, None).await.map_err(persistence_error)?;
        info!("Migrations completed");
        Ok(())
    }

    /// Run a statement that returns rows.
    pub async fn query(&self, statement: Statement) -> Result<Vec<Row>, PersistenceError> {
        debug!(sql = %statement.sql, "query");
        let values = JsonValue::find_by_statement(statement)
            .all(&self.db)
            .await
            .map_err(persistence_error)?;

        values.into_iter().map(into_row).collect()
    }

    /// First row of the result set, if any. Extra rows are ignored.
    pub async fn query_one(&self, statement: Statement) -> Result<Option<Row>, PersistenceError> {
        let mut rows = self.query(statement).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.swap_remove(0)))
    }

    pub async fn query_as<T: DeserializeOwned>(
        &self,
        statement: Statement,
    ) -> Result<Vec<T>, PersistenceError> {
        self.query(statement)
            .await?
            .into_iter()
            .map(decode_row)
            .collect()
    }

    pub async fn query_one_as<T: DeserializeOwned>(
        &self,
        statement: Statement,
    ) -> Result<Option<T>, PersistenceError> {
        self.query_one(statement).await?.map(decode_row).transpose()
    }

    /// Run a write statement. Returns the number of affected rows.
    pub async fn execute(&self, statement: Statement) -> Result<u64, PersistenceError> {
        debug!(sql = %statement.sql, "execute");
        let result = self.db.execute(statement).await.map_err(persistence_error)?;
        Ok(result.rows_affected())
    }

    /// Drain and close the pool. Clones of the connection share the pool, so
    /// this closes it for every holder.
    pub async fn close(&self) -> Result<(), PersistenceError> {
        info!("Closing database pool");
        self.db.clone().close().await.map_err(persistence_error)
    }
}

fn into_row(value: JsonValue) -> Result<Row, PersistenceError> {
    match value {
        Value::Object(map) => Ok(row_to_internal(map)),
        other => Err(PersistenceError::new(
            format!("expected a row object, got {other}"),
            None,
        )),
    }
}

fn decode_row<T: DeserializeOwned>(row: Row) -> Result<T, PersistenceError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| {
        warn!(error = %e, "Failed to decode row");
        PersistenceError::new(e, None)
    })
}

/// Vendor error code reported by the driver, e.g. `"2067"` for a SQLite
/// unique constraint violation.
fn vendor_code(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

fn persistence_error(err: DbErr) -> PersistenceError {
    let code = vendor_code(&err);
    warn!(code = ?code, error = %err, "Database operation failed");
    PersistenceError::new(err, code)
}
