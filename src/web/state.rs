//! # Web Application State
//!
//! Shared state handed to every handler: the telemetry gate and the
//! components built on it, plus the application settings.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{AppSettings, ConfigManager};
use crate::database::{ConnectionGate, DbHealth};
use crate::telemetry::{RequestLogWriter, VersionHitWriter};

#[derive(Debug, Clone)]
pub struct AppState {
    pub app: Arc<AppSettings>,
    pub gate: Arc<ConnectionGate>,
    pub db_health: DbHealth,
    pub request_log: RequestLogWriter,
    pub version_hits: VersionHitWriter,
}

impl AppState {
    pub fn new(app: AppSettings, gate: Arc<ConnectionGate>) -> Self {
        Self {
            app: Arc::new(app),
            db_health: DbHealth::new(gate.clone()),
            request_log: RequestLogWriter::new(gate.clone()),
            version_hits: VersionHitWriter::new(gate.clone()),
            gate,
        }
    }

    /// State over the process-wide configuration and a PostgreSQL gate.
    pub fn from_config_manager(manager: &ConfigManager) -> Self {
        let gate = Arc::new(ConnectionGate::postgres(
            manager.db().clone(),
            manager.settings(),
        ));

        let db = gate.config();
        if let Some(warning) = db.config_warning_if_any() {
            warn!(warning, "Telemetry database misconfigured; responses will carry a warning");
        }
        info!(
            db_enabled = db.is_enabled(),
            db_usable = gate.is_usable(),
            app_version = %manager.app().app_version,
            release_number = manager.app().release_number,
            "Application state initialized"
        );

        Self::new(manager.app().clone(), gate)
    }
}
