//! # Telemetry Database
//!
//! Degraded-mode access to the optional PostgreSQL telemetry store.
//!
//! ## Key Components
//!
//! - [`connection`] - factory seam and the sqlx-backed PostgreSQL implementation
//! - [`gate`] - usability decision and scoped connection acquisition
//! - [`health`] - liveness probe reduced to a [`crate::outcome::DbOutcome`]
//!
//! No pooling: every attempt opens one connection and closes it before
//! returning.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use telemetry_gate::database::{ConnectionGate, DbHealth};
//!
//! # async fn example() {
//! let gate = Arc::new(ConnectionGate::from_environment());
//! let outcome = DbHealth::new(gate).check().await;
//! println!("db ok: {}", outcome.is_ok());
//! # }
//! ```

pub mod connection;
pub mod gate;
pub mod health;

pub use connection::{
    normalize_url, ConnectionFactory, InsertStatement, PgConnectionFactory, SqlParam,
    TelemetryConnection,
};
pub use gate::{ConnectionGate, GateState, DRIVER_UNAVAILABLE_WARNING, NOT_USABLE_MESSAGE};
pub use health::{DbHealth, VALIDITY_CHECK_FAILED_WARNING};
