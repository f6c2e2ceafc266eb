//! # Web API Response Types
//!
//! JSON bodies for the API endpoints, serialized with serde. The `db` field
//! is the telemetry [`DbOutcome`]; `warnings` repeats its warning when the
//! attempt did not succeed.

use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::outcome::DbOutcome;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub route: String,
    pub app_version: String,
    pub release_number: i32,
    pub timestamp: String,
    pub request_id: String,
    pub db: DbOutcome,
    pub warnings: Vec<String>,
}

/// Where the requested version stands relative to the deployed release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseStatus {
    ActiveHere,
    NotYetDeployed,
    OlderRelease,
}

impl ReleaseStatus {
    pub fn classify(requested_version: i32, release_number: i32) -> Self {
        match release_number.cmp(&requested_version) {
            std::cmp::Ordering::Equal => ReleaseStatus::ActiveHere,
            std::cmp::Ordering::Less => ReleaseStatus::NotYetDeployed,
            std::cmp::Ordering::Greater => ReleaseStatus::OlderRelease,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub requested_version: i32,
    pub status: ReleaseStatus,
    pub route: String,
    pub app_version: String,
    pub release_number: i32,
    pub timestamp: String,
    pub request_id: String,
    pub db: DbOutcome,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub route: String,
    pub timestamp: String,
    pub request_id: String,
}

/// JSON body with `Cache-Control: no-store` and `X-Request-Id`.
pub fn json_response<T: Serialize>(status: StatusCode, request_id: &str, body: T) -> Response {
    (
        status,
        [
            (header::CACHE_CONTROL, "no-store".to_string()),
            (X_REQUEST_ID, request_id.to_string()),
        ],
        Json(body),
    )
        .into_response()
}
