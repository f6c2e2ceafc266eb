//! # Best-Effort Telemetry Writers
//!
//! Append-only inserts into the telemetry store. Failures are logged and
//! never propagated: the request-log writer drops them, the version-hit
//! writer reports them as a [`crate::outcome::DbOutcome`].
//!
//! Expected schema (PostgreSQL):
//!
//! ```sql
//! CREATE TABLE request_log (
//!     id BIGSERIAL PRIMARY KEY,
//!     created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
//!     path VARCHAR(255),
//!     remote_addr VARCHAR(64),
//!     app_env VARCHAR(64),
//!     message TEXT
//! );
//!
//! CREATE TABLE version_hit (
//!     id BIGSERIAL PRIMARY KEY,
//!     version INT,
//!     app_version TEXT,
//!     release_number INT,
//!     request_id TEXT,
//!     user_agent TEXT
//! );
//! ```

pub mod request_log;
pub mod version_hit;

pub use request_log::{RequestLogWriter, REQUEST_LOG_INSERT_SQL};
pub use version_hit::{VersionHit, VersionHitWriter, VERSION_HIT_INSERT_SQL};
