//! Configuration Loader
//!
//! Snapshots the process environment through the `config` crate and derives
//! the datastore, gate, and application settings from it exactly once.

use super::{AppSettings, DbConfig, DbSettings};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// The subset of environment variables this crate reads.
///
/// `config::Environment` lowercases keys, so `DB_URL` lands in `db_url`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEnv {
    pub db_url: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_enabled: Option<String>,
    pub db_validity_timeout_secs: Option<String>,
    pub db_connect_timeout_secs: Option<String>,
    pub db_write_timeout_secs: Option<String>,
    pub app_greeting: Option<String>,
    pub app_env: Option<String>,
    pub app_version: Option<String>,
    pub app_release_number: Option<String>,
    pub app_bind_address: Option<String>,
}

impl RawEnv {
    /// Read the variables from `vars`, or from the process environment when `None`.
    pub fn collect(vars: Option<HashMap<String, String>>) -> Result<RawEnv, config::ConfigError> {
        let vars = vars.unwrap_or_else(process_env);
        config::Config::builder()
            .add_source(config::Environment::default().source(Some(vars)))
            .build()?
            .try_deserialize()
    }
}

const ENV_PREFIXES: [&str; 2] = ["db_", "app_"];

/// `DB_*` and `APP_*` process variables with lowercased keys. Entries whose
/// key or value is not valid UTF-8 are skipped; `std::env::vars` would panic.
fn process_env() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| {
            let key = key.into_string().ok()?.to_lowercase();
            let value = value.into_string().ok()?;
            Some((key, value))
        })
        .filter(|(key, _)| ENV_PREFIXES.iter().any(|prefix| key.starts_with(prefix)))
        .collect()
}

pub struct ConfigManager {
    db: DbConfig,
    settings: DbSettings,
    app: AppSettings,
}

impl ConfigManager {
    /// Load from the process environment.
    pub fn load() -> Result<ConfigManager, config::ConfigError> {
        Ok(Self::from_raw(&RawEnv::collect(None)?))
    }

    /// Load from an explicit variable set; unreadable input yields the
    /// all-absent configuration.
    pub fn load_from_vars<I, K, V>(vars: I) -> ConfigManager
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (Into::<String>::into(k).to_lowercase(), v.into()))
            .collect();
        match RawEnv::collect(Some(map)) {
            Ok(raw) => Self::from_raw(&raw),
            Err(e) => {
                warn!(error = %e, "Failed to read configuration variables, treating all as absent");
                Self::emergency_fallback()
            }
        }
    }

    pub fn from_raw(raw: &RawEnv) -> ConfigManager {
        let manager = ConfigManager {
            db: DbConfig::from_raw(raw),
            settings: DbSettings::from_raw(raw),
            app: AppSettings::from_raw(raw),
        };

        debug!(
            db_enabled = manager.db.is_enabled(),
            db_enabled_explicit = manager.db.is_enabled_flag_explicit(),
            db_credentials_present = manager.db.credentials_present(),
            validity_timeout_secs = manager.settings.validity_timeout.as_secs(),
            connect_timeout_secs = manager.settings.connect_timeout.as_secs(),
            write_timeout_secs = manager.settings.write_timeout.as_secs(),
            "Configuration resolved"
        );

        manager
    }

    /// Everything absent: datastore disabled, default timeouts.
    fn emergency_fallback() -> ConfigManager {
        ConfigManager::from_raw(&RawEnv::default())
    }

    pub fn db(&self) -> &DbConfig {
        &self.db
    }

    pub fn settings(&self) -> DbSettings {
        self.settings
    }

    pub fn app(&self) -> &AppSettings {
        &self.app
    }
}

static GLOBAL_CONFIG: OnceLock<Arc<ConfigManager>> = OnceLock::new();

impl ConfigManager {
    /// The process-wide snapshot, taken on first call.
    pub fn global() -> Arc<ConfigManager> {
        GLOBAL_CONFIG
            .get_or_init(|| {
                let manager = ConfigManager::load().unwrap_or_else(|e| {
                    warn!(error = %e, "Configuration loading failed, datastore treated as disabled");
                    ConfigManager::emergency_fallback()
                });
                Arc::new(manager)
            })
            .clone()
    }
}
