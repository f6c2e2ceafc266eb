//! `GET /api/version/{n}`: where release `n` stands here, plus a version-hit
//! telemetry record.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::Response;

use super::{new_request_id, now_rfc3339};
use crate::web::response_types::{json_response, ErrorResponse, ReleaseStatus, VersionResponse};
use crate::web::state::AppState;

pub const MIN_VERSION: i32 = 1;
pub const MAX_VERSION: i32 = 5;

/// Parse the path segment; anything unusable maps to `None`.
pub fn parse_version(raw: &str) -> Option<i32> {
    raw.trim()
        .parse()
        .ok()
        .filter(|v| (MIN_VERSION..=MAX_VERSION).contains(v))
}

fn invalid_version(uri: &Uri, request_id: &str) -> Response {
    json_response(
        StatusCode::BAD_REQUEST,
        request_id,
        ErrorResponse {
            error: format!("Invalid version. Use /api/version/{MIN_VERSION}..{MAX_VERSION}"),
            route: uri.path().to_string(),
            timestamp: now_rfc3339(),
            request_id: request_id.to_string(),
        },
    )
}

pub async fn api_version(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let request_id = new_request_id();
    let Some(requested_version) = parse_version(&raw) else {
        return invalid_version(&uri, &request_id);
    };

    let release_number = state.app.release_number;
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    let db = state
        .version_hits
        .record(
            requested_version,
            &state.app.app_version,
            release_number,
            &request_id,
            user_agent,
        )
        .await;

    let body = VersionResponse {
        requested_version,
        status: ReleaseStatus::classify(requested_version, release_number),
        route: uri.path().to_string(),
        app_version: state.app.app_version.clone(),
        release_number,
        timestamp: now_rfc3339(),
        request_id: request_id.clone(),
        warnings: db.warnings(),
        db,
    };

    json_response(StatusCode::OK, &request_id, body)
}

/// `GET /api/version` without a segment.
pub async fn api_version_missing(uri: Uri) -> Response {
    invalid_version(&uri, &new_request_id())
}
