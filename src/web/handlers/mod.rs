//! # Web API Request Handlers
//!
//! Each handler serves its primary response regardless of the telemetry
//! store; datastore state only ever adds a `db` block and `warnings`.

pub mod health;
pub mod hello;
pub mod version;

/// Fresh UUID v4 request id.
pub(crate) fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
