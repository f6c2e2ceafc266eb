//! # Datastore Outcome
//!
//! Three-state result shared by the health probe and the telemetry writers.
//! Every datastore attempt ends in exactly one of:
//!
//! | variant    | enabled | ok    | warning |
//! |------------|---------|-------|---------|
//! | `Disabled` | false   | true  | none    |
//! | `Ok`       | true    | true  | none    |
//! | `Warn`     | true    | false | some    |
//!
//! No other combination can be built. Serializes to
//! `{"enabled":..,"ok":..,"warning":..}` for the HTTP layer.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::DbError;

/// Longest message kept before an ellipsis is appended.
pub const MAX_WARNING_CHARS: usize = 160;

const ELLIPSIS: &str = "...";

pub const CONNECTIVITY_FAILED_PREFIX: &str = "DB connectivity check failed";
pub const WRITE_FAILED_PREFIX: &str = "DB write failed";
pub const RUNTIME_ERROR_PREFIX: &str = "DB runtime error";

/// Collapse control characters into single spaces, trim, and cap the length
/// at [`MAX_WARNING_CHARS`] characters plus `...`.
///
/// Empty input becomes `"unknown"`.
pub fn sanitize_message(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut in_control_run = false;
    for c in raw.chars() {
        if c.is_control() {
            if !in_control_run {
                cleaned.push(' ');
                in_control_run = true;
            }
        } else {
            cleaned.push(c);
            in_control_run = false;
        }
    }

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return "unknown".to_string();
    }

    match trimmed.char_indices().nth(MAX_WARNING_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// A short, single-line diagnostic safe to hand to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning(String);

impl Warning {
    pub fn new(message: impl AsRef<str>) -> Self {
        Self(sanitize_message(message.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbOutcome {
    /// The datastore is switched off; nothing was attempted.
    Disabled,
    Ok,
    /// Enabled, but the attempt was skipped or failed.
    Warn(Warning),
}

impl DbOutcome {
    pub fn disabled() -> Self {
        DbOutcome::Disabled
    }

    pub fn ok() -> Self {
        DbOutcome::Ok
    }

    pub fn warn(message: impl AsRef<str>) -> Self {
        DbOutcome::Warn(Warning::new(message))
    }

    /// Warn outcome for a failed write: `DB write failed: <detail>`, or
    /// `DB runtime error: <detail>` for faults outside the statement itself.
    pub fn write_failure(err: &DbError) -> Self {
        let prefix = match err {
            DbError::Unexpected(_) => RUNTIME_ERROR_PREFIX,
            _ => WRITE_FAILED_PREFIX,
        };
        Self::with_detail(prefix, err)
    }

    /// Warn outcome for a failed liveness check, whatever the cause.
    pub fn connectivity_failure(err: &DbError) -> Self {
        Self::with_detail(CONNECTIVITY_FAILED_PREFIX, err)
    }

    fn with_detail(prefix: &str, err: &DbError) -> Self {
        let detail = sanitize_message(&err.to_string());
        Self::warn(format!("{prefix}: {detail}"))
    }

    pub fn enabled(&self) -> bool {
        !matches!(self, DbOutcome::Disabled)
    }

    pub fn is_ok(&self) -> bool {
        !matches!(self, DbOutcome::Warn(_))
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            DbOutcome::Warn(w) => Some(w.as_str()),
            _ => None,
        }
    }

    /// The `warnings` list rendered next to the outcome in API responses.
    pub fn warnings(&self) -> Vec<String> {
        match self.warning() {
            Some(w) if self.enabled() && !self.is_ok() => vec![w.to_string()],
            _ => Vec::new(),
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            DbOutcome::Disabled => "disabled",
            DbOutcome::Ok => "ok",
            DbOutcome::Warn(_) => "warn",
        }
    }
}

#[derive(Serialize)]
struct OutcomeView<'a> {
    enabled: bool,
    ok: bool,
    warning: Option<&'a str>,
}

impl Serialize for DbOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OutcomeView {
            enabled: self.enabled(),
            ok: self.is_ok(),
            warning: self.warning(),
        }
        .serialize(serializer)
    }
}
