//! Query client trait and MySQL implementation
//!
//! The trait is the dependency-injection seam for the pipeline: production
//! code talks to `MySqlClient`, tests substitute a fake. Connection
//! acquisition and release are scoped by the sqlx pool (a connection is
//! returned to the pool on every exit path when the row stream drops).

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use snapsync_core::{ErrorKind, Result, Row, SnapError};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row as _};

/// Read-only query execution against the source database.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Execute a read-only statement with optional bound parameters and
    /// return the result set as ordered records (column name -> value).
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Fetch the live column set for a relation from schema metadata.
    async fn table_columns(&self, table: &str) -> Result<HashSet<String>>;
}

/// MySQL client over a bounded connection pool.
pub struct MySqlClient {
    pool: MySqlPool,
    database: String,
}

impl MySqlClient {
    /// Connect a pool using the configured host/credentials and the fixed
    /// connection timeout.
    pub async fn connect(config: &snapsync_core::DbConfig) -> Result<Self> {
        let url = format!(
            "mysql://{}:{}@{}:{}/{}",
            config.user, config.password, config.host, config.port, config.database
        );
        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.connect_timeout)
            .connect(&url)
            .await
            .map_err(|e| from_sqlx("connect", e))?;

        tracing::debug!(
            host = %config.host,
            database = %config.database,
            pool_size = config.pool_size,
            "Connected MySQL pool"
        );

        Ok(Self {
            pool,
            database: config.database.clone(),
        })
    }
}

#[async_trait]
impl QueryClient for MySqlClient {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_value(query, param);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| from_sqlx("fetch_all", e))?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn table_columns(&self, table: &str) -> Result<HashSet<String>> {
        let sql = "SELECT COLUMN_NAME FROM information_schema.columns \
                   WHERE table_schema = ? AND table_name = ?";
        let rows = sqlx::query(sql)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| from_sqlx("table_columns", e))?;

        Ok(rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>(0).ok())
            .collect())
    }
}

type MySqlQuery<'q> = sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>;

fn bind_value<'q>(query: MySqlQuery<'q>, value: &'q Value) -> MySqlQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else {
                query.bind(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => query.bind(s.as_str()),
        // Arrays/objects have no SQL scalar form; bind their JSON text.
        other => query.bind(other.to_string()),
    }
}

/// Convert one result row to a name -> JSON value record, preserving the
/// select-clause column order.
fn row_to_record(row: &MySqlRow) -> Row {
    let mut record = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        record.insert(column.name().to_string(), column_to_json(row, idx));
    }
    record
}

/// Decode a column to a JSON scalar by trying the common MySQL decodings
/// in order. NULLs decode to `Ok(None)` for any compatible type, so the
/// first compatible branch handles them.
fn column_to_json(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
        return v
            .map(|d| Value::from(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
        return v
            .map(|d| Value::from(d.format("%Y-%m-%d %H:%M:%S").to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx) {
        return v.map(|d| Value::from(d.to_rfc3339())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    // Binary or exotic types: render lossily rather than failing the export.
    match row.try_get::<Option<Vec<u8>>, _>(idx) {
        Ok(Some(bytes)) => Value::from(String::from_utf8_lossy(&bytes).into_owned()),
        _ => Value::Null,
    }
}

/// Map an sqlx error to the canonical taxonomy. Pool acquire timeouts and
/// I/O failures are the transient `Timeout` kind; everything else from the
/// server is `Database`.
fn from_sqlx(op: &str, err: sqlx::Error) -> SnapError {
    let kind = match &err {
        sqlx::Error::PoolTimedOut => ErrorKind::Timeout,
        sqlx::Error::Io(_) => ErrorKind::Timeout,
        _ => ErrorKind::Database,
    };
    SnapError::new(kind).with_op(op).with_message(err.to_string())
}
