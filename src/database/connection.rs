//! # Connection Seam
//!
//! The gate never talks to sqlx directly. It goes through a
//! [`ConnectionFactory`], which answers two questions: can the compiled-in
//! driver serve the configured URL, and can it open one connection with the
//! resolved credentials. Each opened [`TelemetryConnection`] serves exactly
//! one operation and is then closed.
//!
//! [`PgConnectionFactory`] is the production implementation; tests substitute
//! in-memory factories.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;

use crate::config::Credentials;
use crate::error::{DbError, DbResult};

/// A bound parameter. Values are never spliced into SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i32),
    Text(String),
}

/// A parameterized single-row insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    table: &'static str,
    sql: &'static str,
    params: Vec<SqlParam>,
}

impl InsertStatement {
    pub fn new(table: &'static str, sql: &'static str) -> Self {
        Self {
            table,
            sql,
            params: Vec::new(),
        }
    }

    pub fn bind_int(mut self, value: i32) -> Self {
        self.params.push(SqlParam::Int(value));
        self
    }

    /// Bind a text value; `None` is written as an empty string.
    pub fn bind_text(mut self, value: Option<&str>) -> Self {
        self.params
            .push(SqlParam::Text(value.unwrap_or_default().to_string()));
        self
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }
}

/// One open connection to the telemetry store.
#[async_trait]
pub trait TelemetryConnection: Send + std::fmt::Debug {
    /// Cheap round trip proving the connection is alive.
    async fn ping(&mut self) -> DbResult<()>;

    /// Prepare and execute `statement`, returning affected rows.
    async fn execute(&mut self, statement: &InsertStatement) -> DbResult<u64>;

    /// Graceful close. Dropping without closing still releases the connection.
    async fn close(self: Box<Self>) -> DbResult<()>;
}

#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Whether the backing driver can serve `url`. Called once per gate.
    fn load_driver(&self, url: Option<&str>) -> DbResult<()>;

    async fn connect(&self, credentials: Credentials<'_>) -> DbResult<Box<dyn TelemetryConnection>>;
}

/// Strip a legacy `jdbc:` prefix so `jdbc:postgresql://...` is accepted.
pub fn normalize_url(url: &str) -> &str {
    url.strip_prefix("jdbc:").unwrap_or(url)
}

fn url_scheme(url: &str) -> Option<&str> {
    url.split_once("://").map(|(scheme, _)| scheme)
}

/// PostgreSQL over a single unpooled `sqlx::PgConnection`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnectionFactory;

impl PgConnectionFactory {
    const SCHEMES: [&'static str; 2] = ["postgres", "postgresql"];

    fn connect_options(credentials: Credentials<'_>) -> DbResult<PgConnectOptions> {
        let options = PgConnectOptions::from_str(normalize_url(credentials.url))
            .map_err(|e| DbError::Connectivity(e.to_string()))?;
        Ok(options
            .username(credentials.user)
            .password(credentials.password)
            .disable_statement_logging())
    }
}

#[async_trait]
impl ConnectionFactory for PgConnectionFactory {
    fn load_driver(&self, url: Option<&str>) -> DbResult<()> {
        let Some(url) = url else {
            return Ok(());
        };
        let url = normalize_url(url);

        match url_scheme(url) {
            Some(scheme) if Self::SCHEMES.contains(&scheme.to_lowercase().as_str()) => {}
            Some(scheme) => {
                return Err(DbError::DriverUnavailable(format!(
                    "no PostgreSQL driver for URL scheme '{scheme}'"
                )))
            }
            None => {
                return Err(DbError::DriverUnavailable(
                    "DB_URL has no scheme; expected postgres:// or postgresql://".to_string(),
                ))
            }
        }

        PgConnectOptions::from_str(url)
            .map(|_| ())
            .map_err(|e| DbError::DriverUnavailable(e.to_string()))
    }

    async fn connect(&self, credentials: Credentials<'_>) -> DbResult<Box<dyn TelemetryConnection>> {
        let options = Self::connect_options(credentials)?;
        let conn = PgConnection::connect_with(&options).await?;
        Ok(Box::new(PgTelemetryConnection { conn }))
    }
}

pub struct PgTelemetryConnection {
    conn: PgConnection,
}

impl std::fmt::Debug for PgTelemetryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTelemetryConnection").finish_non_exhaustive()
    }
}

#[async_trait]
impl TelemetryConnection for PgTelemetryConnection {
    async fn ping(&mut self) -> DbResult<()> {
        self.conn.ping().await.map_err(DbError::from)
    }

    async fn execute(&mut self, statement: &InsertStatement) -> DbResult<u64> {
        let mut query = sqlx::query(statement.sql());
        for param in statement.params() {
            query = match param {
                SqlParam::Int(value) => query.bind(*value),
                SqlParam::Text(value) => query.bind(value.as_str()),
            };
        }

        let result = query
            .execute(&mut self.conn)
            .await
            .map_err(|e| DbError::Write(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn close(self: Box<Self>) -> DbResult<()> {
        self.conn.close().await.map_err(DbError::from)
    }
}
