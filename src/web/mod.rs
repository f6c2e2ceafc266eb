//! # Web Layer
//!
//! Thin axum plumbing over the telemetry core:
//!
//! - `GET /hello` - greeting, request logged best-effort
//! - `GET /api/health` - service health with telemetry store status
//! - `GET /api/version/{n}` - release status with version-hit telemetry

pub mod handlers;
pub mod response_types;
pub mod state;

use axum::routing::get;
use axum::Router;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/hello", get(handlers::hello::hello))
        .route("/api/health", get(handlers::health::api_health))
        .route("/api/version", get(handlers::version::api_version_missing))
        .route("/api/version/{version}", get(handlers::version::api_version))
        .with_state(state)
}
