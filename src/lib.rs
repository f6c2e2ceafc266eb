#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Telemetry Gate
//!
//! Degraded-mode access to an optional PostgreSQL telemetry store for a small
//! request-serving application.
//!
//! ## Overview
//!
//! The application must stay fully functional when the datastore is absent,
//! misconfigured, or unreachable. This crate decides from the environment
//! alone whether the datastore may be used, verifies the driver once, probes
//! liveness, and turns every failure into a [`outcome::DbOutcome`] instead of
//! an error on the request path.
//!
//! ## Module Organization
//!
//! - [`config`] - environment snapshot and enablement rules
//! - [`database`] - connection gate, connection seam, health probe
//! - [`outcome`] - the disabled / ok / warn result value
//! - [`telemetry`] - best-effort request-log and version-hit writers
//! - [`error`] - error taxonomy for the connection boundary
//! - [`logging`] - structured logging setup
//! - [`web`] - thin HTTP layer consuming the core
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use telemetry_gate::database::{ConnectionGate, DbHealth};
//! use telemetry_gate::telemetry::VersionHitWriter;
//!
//! # async fn example() {
//! let gate = Arc::new(ConnectionGate::from_environment());
//!
//! let health = DbHealth::new(gate.clone()).check().await;
//! let hit = VersionHitWriter::new(gate)
//!     .record(2, "1.4.0", 2, "req-42", Some("curl/8.5"))
//!     .await;
//!
//! println!("health={} hit={}", health.status_label(), hit.status_label());
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                                              # fakes only
//! TEST_DATABASE_URL=postgres://... cargo test --test postgres_integration_test
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod outcome;
pub mod telemetry;
pub mod web;

pub use config::{AppSettings, ConfigManager, DbConfig, DbSettings};
pub use database::{ConnectionFactory, ConnectionGate, DbHealth, GateState, PgConnectionFactory};
pub use error::{DbError, DbResult};
pub use outcome::{sanitize_message, DbOutcome, Warning};
pub use telemetry::{RequestLogWriter, VersionHitWriter};
