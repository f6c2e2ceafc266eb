//! `GET /hello`: plain-text greeting, then a fire-and-forget request log.

use axum::extract::{ConnectInfo, Query, State};
use axum::http::Uri;
use serde::Deserialize;
use std::net::SocketAddr;

use crate::web::state::AppState;

const DEFAULT_PREFIX: &str = "Hello";
const DEFAULT_NAME: &str = "World";

#[derive(Debug, Default, Deserialize)]
pub struct HelloParams {
    pub name: Option<String>,
}

pub fn greet(name: Option<&str>, prefix: Option<&str>) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(DEFAULT_NAME);
    let prefix = prefix.map(str::trim).filter(|p| !p.is_empty()).unwrap_or(DEFAULT_PREFIX);
    format!("{prefix}, {name}!")
}

pub async fn hello(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    Query(params): Query<HelloParams>,
    uri: Uri,
) -> String {
    let message = greet(params.name.as_deref(), state.app.greeting.as_deref());

    let writer = state.request_log.clone();
    let app_env = state.app.app_env.clone();
    let path = uri.path().to_string();
    let remote_addr = remote.ip().to_string();
    let logged = message.clone();
    tokio::spawn(async move {
        writer
            .record(&path, &remote_addr, app_env.as_deref(), Some(&logged))
            .await;
    });

    message
}
