mod common;

use axum::body::{to_bytes, Body};
use axum::extract::connect_info::MockConnectInfo;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode, Uri};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tower::ServiceExt;

use common::*;
use telemetry_gate::config::AppSettings;
use telemetry_gate::database::SqlParam;
use telemetry_gate::web::handlers::health::api_health;
use telemetry_gate::web::handlers::hello::{hello, HelloParams};
use telemetry_gate::web::handlers::version::api_version;
use telemetry_gate::web::{router, AppState};

fn state_with(behavior: Behavior, vars: Vec<(&'static str, &'static str)>) -> (AppState, std::sync::Arc<FakeStore>) {
    let (gate, store) = gate_with(behavior, vars);
    let app = AppSettings {
        greeting: Some("Howdy".into()),
        app_env: Some("test".into()),
        app_version: "1.4.0".into(),
        release_number: 3,
        bind_address: "127.0.0.1:0".into(),
    };
    (AppState::new(app, gate), store)
}

async fn json_body(response: Response) -> (StatusCode, HeaderMap, Value) {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_is_up_when_db_disabled() {
    let (state, _store) = state_with(Behavior::Healthy, vec![]);

    let response = api_health(State(state), Uri::from_static("/api/health")).await;
    let (status, headers, body) = json_body(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert_eq!(
        headers["x-request-id"].to_str().unwrap(),
        body["requestId"].as_str().unwrap()
    );
    assert_eq!(body["status"], "UP");
    assert_eq!(body["route"], "/api/health");
    assert_eq!(body["appVersion"], "1.4.0");
    assert_eq!(body["releaseNumber"], 3);
    assert_eq!(
        body["db"],
        serde_json::json!({"enabled": false, "ok": true, "warning": null})
    );
    assert_eq!(body["warnings"], serde_json::json!([]));
}

#[tokio::test]
async fn test_health_stays_up_with_warning() {
    let (state, _store) = state_with(Behavior::ConnectFails("refused".into()), configured_vars());

    let response = api_health(State(state), Uri::from_static("/api/health")).await;
    let (status, _headers, body) = json_body(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["db"]["ok"], false);
    assert_eq!(
        body["warnings"],
        serde_json::json!(["DB connectivity check failed: refused"])
    );
}

#[tokio::test]
async fn test_version_records_hit_and_classifies_release() {
    let (state, store) = state_with(Behavior::Healthy, configured_vars());
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.5"));

    let response = api_version(
        State(state),
        Path("4".to_string()),
        headers,
        Uri::from_static("/api/version/4"),
    )
    .await;
    let (status, _headers, body) = json_body(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requestedVersion"], 4);
    assert_eq!(body["status"], "NOT_YET_DEPLOYED");
    assert_eq!(body["db"]["ok"], true);
    assert_eq!(body["db"]["enabled"], true);

    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    let params = rows[0].params();
    assert_eq!(params[0], SqlParam::Int(4));
    assert_eq!(params[2], SqlParam::Int(3));
    assert_eq!(
        params[3],
        SqlParam::Text(body["requestId"].as_str().unwrap().to_string())
    );
    assert_eq!(params[4], SqlParam::Text("curl/8.5".into()));
}

#[tokio::test]
async fn test_version_rejects_out_of_range() {
    let (state, store) = state_with(Behavior::Healthy, configured_vars());

    let response = api_version(
        State(state),
        Path("9".to_string()),
        HeaderMap::new(),
        Uri::from_static("/api/version/9"),
    )
    .await;
    let (status, _headers, body) = json_body(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid version. Use /api/version/1..5");
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn test_version_reports_config_warning() {
    let (state, _store) = state_with(Behavior::Healthy, vec![("DB_ENABLED", "true")]);

    let response = api_version(
        State(state),
        Path("3".to_string()),
        HeaderMap::new(),
        Uri::from_static("/api/version/3"),
    )
    .await;
    let (status, _headers, body) = json_body(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACTIVE_HERE");
    assert_eq!(
        body["warnings"],
        serde_json::json!(["DB_ENABLED=true but DB_URL/DB_USER/DB_PASSWORD are missing."])
    );
}

#[tokio::test]
async fn test_hello_greets_and_logs_request() {
    let (state, store) = state_with(Behavior::Healthy, configured_vars());
    let remote: SocketAddr = "10.1.2.3:55000".parse().unwrap();

    let message = hello(
        State(state),
        ConnectInfo(remote),
        Query(HelloParams {
            name: Some("Ada".into()),
        }),
        Uri::from_static("/hello?name=Ada"),
    )
    .await;
    assert_eq!(message, "Howdy, Ada!");

    // the log write is spawned; give it a moment
    for _ in 0..50 {
        if !store.rows().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].params(),
        &[
            SqlParam::Text("/hello".into()),
            SqlParam::Text("10.1.2.3".into()),
            SqlParam::Text("test".into()),
            SqlParam::Text("Howdy, Ada!".into()),
        ]
    );
}

#[tokio::test]
async fn test_hello_unaffected_by_broken_store() {
    let (state, store) = state_with(Behavior::WriteFails("boom".into()), configured_vars());
    let remote: SocketAddr = "127.0.0.1:1".parse().unwrap();

    let message = hello(
        State(state),
        ConnectInfo(remote),
        Query(HelloParams::default()),
        Uri::from_static("/hello"),
    )
    .await;

    assert_eq!(message, "Howdy, World!");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.rows().is_empty());
}

fn routed_app(state: AppState) -> Router {
    router(state).layer(MockConnectInfo(SocketAddr::from(([10, 0, 0, 9], 4000))))
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::USER_AGENT, "router-test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_router_serves_version_path_parameter() {
    let (state, store) = state_with(Behavior::Healthy, configured_vars());
    let app = routed_app(state);

    let (status, headers, body) = json_body(get(&app, "/api/version/3").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert_eq!(body["requestedVersion"], 3);
    assert_eq!(body["status"], "ACTIVE_HERE");
    assert_eq!(body["route"], "/api/version/3");

    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].params()[4], SqlParam::Text("router-test".into()));
}

#[tokio::test]
async fn test_router_rejects_missing_and_malformed_versions() {
    let (state, store) = state_with(Behavior::Healthy, configured_vars());
    let app = routed_app(state);

    for uri in ["/api/version", "/api/version/abc", "/api/version/0"] {
        let (status, headers, body) = json_body(get(&app, uri).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(headers.contains_key("x-request-id"));
        assert_eq!(body["error"], "Invalid version. Use /api/version/1..5");
        assert_eq!(body["route"], uri);
    }
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn test_router_health_route() {
    let (state, _store) = state_with(Behavior::Healthy, vec![]);
    let app = routed_app(state);

    let (status, _headers, body) = json_body(get(&app, "/api/health").await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["db"]["enabled"], false);
}

#[tokio::test]
async fn test_router_hello_uses_connect_info() {
    let (state, store) = state_with(Behavior::Healthy, configured_vars());
    let app = routed_app(state);

    let response = get(&app, "/hello?name=Ada").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Howdy, Ada!");

    for _ in 0..50 {
        if !store.rows().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].params()[1], SqlParam::Text("10.0.0.9".into()));
}
