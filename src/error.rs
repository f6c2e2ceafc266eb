//! Error types for the telemetry datastore gate.
//!
//! Only [`crate::database::ConnectionGate::open_connection`] and the
//! connection seam return these; every public entry point above them turns
//! a `DbError` into a [`crate::outcome::DbOutcome`] instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbError {
    /// The gate is closed: disabled, enabled without credentials, or no driver.
    #[error("{0}")]
    NotUsable(String),
    #[error("Driver unavailable: {0}")]
    DriverUnavailable(String),
    /// Network, authentication, or timeout failure while talking to the store.
    #[error("{0}")]
    Connectivity(String),
    #[error("{0}")]
    Write(String),
    #[error("{0}")]
    Unexpected(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Connectivity(err.to_string())
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
