//! # Telemetry Gate Configuration
//!
//! Everything here is derived once from a snapshot of the process environment
//! and never recomputed; environment variables are assumed not to change
//! while the process runs.
//!
//! ## Enablement rules
//!
//! - `DB_URL`, `DB_USER`, `DB_PASSWORD` are trimmed; blank means absent.
//! - Credentials are present only when all three are.
//! - `DB_ENABLED` absent: enabled iff credentials are present (legacy inference).
//! - `DB_ENABLED` present: lenient boolean, anything unrecognised is `false`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use telemetry_gate::config::DbConfig;
//!
//! let config = DbConfig::resolve();
//! if let Some(warning) = config.config_warning_if_any() {
//!     eprintln!("{warning}");
//! }
//! ```

pub mod loader;

use std::fmt;
use std::time::Duration;
use tracing::warn;

pub use loader::{ConfigManager, RawEnv};

/// Warning surfaced when the datastore is switched on without credentials.
pub const CONFIG_WARNING_MISSING_CREDENTIALS: &str =
    "DB_ENABLED=true but DB_URL/DB_USER/DB_PASSWORD are missing.";

pub const DEFAULT_VALIDITY_TIMEOUT_SECS: u64 = 2;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_RELEASE_NUMBER: i32 = 1;

/// Trim a raw value, treating blank as absent.
pub(crate) fn trim_or_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Lenient boolean: `true/1/yes/y` and `false/0/no/n`, case-insensitive.
/// Anything else is `false` so garbage never switches the datastore on.
pub fn parse_bool_lenient(raw: &str) -> bool {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        _ => false,
    }
}

/// Enablement decision plus the credentials it was derived from.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    url: Option<String>,
    user: Option<String>,
    password: Option<String>,
    /// `None` when `DB_ENABLED` was not supplied.
    explicit_flag: Option<bool>,
    enabled: bool,
    credentials_present: bool,
}

impl DbConfig {
    /// The process-wide configuration, snapshotted on first access.
    pub fn resolve() -> DbConfig {
        ConfigManager::global().db().clone()
    }

    /// Build from an explicit set of variables instead of the process
    /// environment.
    pub fn from_vars<I, K, V>(vars: I) -> DbConfig
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ConfigManager::load_from_vars(vars).db().clone()
    }

    pub fn from_raw(raw: &RawEnv) -> DbConfig {
        let url = trim_or_none(raw.db_url.as_deref());
        let user = trim_or_none(raw.db_user.as_deref());
        let password = trim_or_none(raw.db_password.as_deref());
        let credentials_present = url.is_some() && user.is_some() && password.is_some();

        let explicit_flag = trim_or_none(raw.db_enabled.as_deref()).map(|v| parse_bool_lenient(&v));
        let enabled = match explicit_flag {
            None => credentials_present,
            Some(flag) => flag,
        };

        DbConfig {
            url,
            user,
            password,
            explicit_flag,
            enabled,
            credentials_present,
        }
    }

    /// Logically enabled; may still be unusable (credentials, driver, network).
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn credentials_present(&self) -> bool {
        self.credentials_present
    }

    pub fn is_enabled_flag_explicit(&self) -> bool {
        self.explicit_flag.is_some()
    }

    pub fn explicit_flag(&self) -> Option<bool> {
        self.explicit_flag
    }

    /// The one place that detects "turned on but not configured".
    pub fn config_warning_if_any(&self) -> Option<&'static str> {
        if self.enabled && !self.credentials_present {
            Some(CONFIG_WARNING_MISSING_CREDENTIALS)
        } else {
            None
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// All three credentials, or `None` if any is missing.
    pub fn credentials(&self) -> Option<Credentials<'_>> {
        Some(Credentials {
            url: self.url.as_deref()?,
            user: self.user.as_deref()?,
            password: self.password.as_deref()?,
        })
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***REDACTED***"))
            .field("explicit_flag", &self.explicit_flag)
            .field("enabled", &self.enabled)
            .field("credentials_present", &self.credentials_present)
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub url: &'a str,
    pub user: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"***REDACTED***")
            .finish()
    }
}

/// Timeouts applied around connection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbSettings {
    /// Bound on the liveness ping after a connection is opened.
    pub validity_timeout: Duration,
    pub connect_timeout: Duration,
    /// Bound on the work done with an open connection, and separately on closing it.
    pub write_timeout: Duration,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            validity_timeout: Duration::from_secs(DEFAULT_VALIDITY_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            write_timeout: Duration::from_secs(DEFAULT_WRITE_TIMEOUT_SECS),
        }
    }
}

impl DbSettings {
    pub fn from_raw(raw: &RawEnv) -> DbSettings {
        DbSettings {
            validity_timeout: Duration::from_secs(parse_or_default(
                "DB_VALIDITY_TIMEOUT_SECS",
                raw.db_validity_timeout_secs.as_deref(),
                DEFAULT_VALIDITY_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(parse_or_default(
                "DB_CONNECT_TIMEOUT_SECS",
                raw.db_connect_timeout_secs.as_deref(),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            write_timeout: Duration::from_secs(parse_or_default(
                "DB_WRITE_TIMEOUT_SECS",
                raw.db_write_timeout_secs.as_deref(),
                DEFAULT_WRITE_TIMEOUT_SECS,
            )),
        }
    }
}

/// Settings consumed by the HTTP layer only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub greeting: Option<String>,
    pub app_env: Option<String>,
    pub app_version: String,
    pub release_number: i32,
    pub bind_address: String,
}

impl AppSettings {
    pub fn from_raw(raw: &RawEnv) -> AppSettings {
        AppSettings {
            greeting: trim_or_none(raw.app_greeting.as_deref()),
            app_env: trim_or_none(raw.app_env.as_deref()),
            app_version: trim_or_none(raw.app_version.as_deref())
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            release_number: parse_or_default(
                "APP_RELEASE_NUMBER",
                raw.app_release_number.as_deref(),
                DEFAULT_RELEASE_NUMBER,
            ),
            bind_address: trim_or_none(raw.app_bind_address.as_deref())
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings::from_raw(&RawEnv::default())
    }
}

fn parse_or_default<T>(name: &str, raw: Option<&str>, default: T) -> T
where
    T: std::str::FromStr + Copy + fmt::Display,
{
    let Some(value) = trim_or_none(raw) else {
        return default;
    };
    value.parse().unwrap_or_else(|_| {
        warn!(
            variable = name,
            value = %value,
            default = %default,
            "Unparseable value, using default"
        );
        default
    })
}
