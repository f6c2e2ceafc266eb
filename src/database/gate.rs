//! # Connection Gate
//!
//! Decides whether the telemetry store may be touched at all and mediates
//! connection acquisition.
//!
//! Usability is `enabled && credentials_present && driver_available` and is
//! recomputed on every call; only the driver check is stored. That check runs
//! lazily, at most once per gate, behind a `OnceLock`, so concurrent first
//! callers wait for a single initializer and all see the same answer.
//!
//! [`ConnectionGate::is_usable`] never fails. [`ConnectionGate::open_connection`]
//! is the only operation in this crate allowed to return an error to its
//! caller; the health probe and the telemetry writers convert that error into
//! a [`DbOutcome`].

use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info};

use super::connection::{ConnectionFactory, PgConnectionFactory, TelemetryConnection};
use crate::config::{ConfigManager, DbConfig, DbSettings};
use crate::error::{DbError, DbResult};
use crate::outcome::DbOutcome;

/// Warning when the store is enabled and configured but the gate stays closed.
pub const DRIVER_UNAVAILABLE_WARNING: &str =
    "DB is enabled but not usable (driver/credentials missing).";

/// Raised by `open_connection` when there is no configuration warning to report.
pub const NOT_USABLE_MESSAGE: &str =
    "Database is not enabled, not configured, or driver not available.";

/// Where an attempt stands before any connection is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Disabled,
    ConfigWarning(&'static str),
    DriverUnavailable,
    /// Everything checks out; the attempt may proceed.
    Attempting,
}

impl GateState {
    /// The outcome to report when no attempt will be made.
    pub fn skip_outcome(&self) -> Option<DbOutcome> {
        match self {
            GateState::Disabled => Some(DbOutcome::disabled()),
            GateState::ConfigWarning(warning) => Some(DbOutcome::warn(warning)),
            GateState::DriverUnavailable => Some(DbOutcome::warn(DRIVER_UNAVAILABLE_WARNING)),
            GateState::Attempting => None,
        }
    }
}

pub struct ConnectionGate {
    config: DbConfig,
    settings: DbSettings,
    factory: Arc<dyn ConnectionFactory>,
    driver_available: OnceLock<bool>,
}

impl std::fmt::Debug for ConnectionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGate")
            .field("config", &self.config)
            .field("settings", &self.settings)
            .field("driver_available", &self.driver_available.get())
            .finish_non_exhaustive()
    }
}

impl ConnectionGate {
    pub fn new(
        config: DbConfig,
        settings: DbSettings,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Self {
        Self {
            config,
            settings,
            factory,
            driver_available: OnceLock::new(),
        }
    }

    /// Gate backed by PostgreSQL.
    pub fn postgres(config: DbConfig, settings: DbSettings) -> Self {
        Self::new(config, settings, Arc::new(PgConnectionFactory))
    }

    /// PostgreSQL gate over the process-wide configuration snapshot.
    pub fn from_environment() -> Self {
        let manager = ConfigManager::global();
        Self::postgres(manager.db().clone(), manager.settings())
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn settings(&self) -> DbSettings {
        self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.driver_available.get().is_some()
    }

    /// Driver availability, initializing the gate if needed.
    pub fn driver_available(&self) -> bool {
        self.initialize_once()
    }

    fn initialize_once(&self) -> bool {
        *self.driver_available.get_or_init(|| self.load_driver())
    }

    fn load_driver(&self) -> bool {
        if !self.config.is_enabled() {
            debug!("Telemetry database disabled, skipping driver check");
            return false;
        }

        match self.factory.load_driver(self.config.url()) {
            Ok(()) => {
                info!("Telemetry database driver available");
                true
            }
            Err(e) => {
                error!(
                    error = %e,
                    "Telemetry database driver unavailable. External DB will be treated as unusable."
                );
                false
            }
        }
    }

    pub fn is_usable(&self) -> bool {
        let driver_available = self.initialize_once();
        self.config.is_enabled() && self.config.credentials_present() && driver_available
    }

    /// Staged pre-check shared by the health probe and the version-hit writer.
    pub fn state(&self) -> GateState {
        if !self.config.is_enabled() {
            return GateState::Disabled;
        }
        if let Some(warning) = self.config.config_warning_if_any() {
            return GateState::ConfigWarning(warning);
        }
        if !self.is_usable() {
            return GateState::DriverUnavailable;
        }
        GateState::Attempting
    }

    /// Open a fresh connection.
    ///
    /// Fails with [`DbError::NotUsable`] when the gate is closed and with
    /// [`DbError::Connectivity`] when the factory cannot connect within
    /// the configured timeout.
    pub async fn open_connection(&self) -> DbResult<Box<dyn TelemetryConnection>> {
        let not_usable = || {
            DbError::NotUsable(
                self.config
                    .config_warning_if_any()
                    .unwrap_or(NOT_USABLE_MESSAGE)
                    .to_string(),
            )
        };

        if !self.is_usable() {
            return Err(not_usable());
        }
        let credentials = self.config.credentials().ok_or_else(not_usable)?;

        let timeout = self.settings.connect_timeout;
        match tokio::time::timeout(timeout, self.factory.connect(credentials)).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(DbError::Connectivity(message))) => Err(DbError::Connectivity(message)),
            Ok(Err(other)) => Err(DbError::Connectivity(other.to_string())),
            Err(_) => Err(DbError::Connectivity(format!(
                "timed out after {}s opening connection",
                timeout.as_secs_f64()
            ))),
        }
    }

    /// Run `op` on a connection owned by this call alone.
    ///
    /// The connection is closed on every exit path. `op` and the close are
    /// each bounded by the write timeout; an expired `op` is returned as
    /// [`DbError::Connectivity`]. A panic inside `op` is caught and returned
    /// as [`DbError::Unexpected`].
    pub async fn with_connection<T, F>(&self, op: F) -> DbResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut dyn TelemetryConnection) -> BoxFuture<'c, DbResult<T>> + Send,
    {
        let mut conn = self.open_connection().await?;
        let timeout = self.settings.write_timeout;

        let result = {
            let conn_ref: &mut dyn TelemetryConnection = conn.as_mut();
            let guarded = AssertUnwindSafe(async move { op(conn_ref).await }).catch_unwind();
            match tokio::time::timeout(timeout, guarded).await {
                Ok(Ok(result)) => result,
                Ok(Err(panic)) => Err(DbError::Unexpected(panic_message(&*panic))),
                Err(_) => Err(DbError::Connectivity(format!(
                    "timed out after {}s waiting on the datastore",
                    timeout.as_secs_f64()
                ))),
            }
        };

        // Dropping an unclosed connection still releases it.
        match tokio::time::timeout(timeout, conn.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "Closing telemetry connection failed"),
            Err(_) => debug!(
                timeout_secs = timeout.as_secs_f64(),
                "Closing telemetry connection timed out"
            ),
        }

        result
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
