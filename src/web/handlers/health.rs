//! # Health Check Handler
//!
//! `GET /api/health`. Always answers 200 with `status: "UP"`; the telemetry
//! store's state is reported in `db` and `warnings`.

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::Response;
use tracing::debug;

use super::{new_request_id, now_rfc3339};
use crate::web::response_types::{json_response, HealthResponse};
use crate::web::state::AppState;

pub async fn api_health(State(state): State<AppState>, uri: Uri) -> Response {
    let request_id = new_request_id();
    let db = state.db_health.check().await;

    debug!(
        request_id = %request_id,
        db_status = db.status_label(),
        "Health check"
    );

    let body = HealthResponse {
        status: "UP",
        route: uri.path().to_string(),
        app_version: state.app.app_version.clone(),
        release_number: state.app.release_number,
        timestamp: now_rfc3339(),
        request_id: request_id.clone(),
        warnings: db.warnings(),
        db,
    };

    json_response(StatusCode::OK, &request_id, body)
}
