//! Fire-and-forget logging of `/hello` requests.

use std::sync::Arc;
use tracing::{debug, error};

use crate::database::{ConnectionGate, InsertStatement};
use crate::outcome::sanitize_message;

pub const REQUEST_LOG_INSERT_SQL: &str =
    "INSERT INTO request_log (path, remote_addr, app_env, message) VALUES ($1, $2, $3, $4)";

#[derive(Debug, Clone)]
pub struct RequestLogWriter {
    gate: Arc<ConnectionGate>,
}

impl RequestLogWriter {
    pub fn new(gate: Arc<ConnectionGate>) -> Self {
        Self { gate }
    }

    /// Insert one `request_log` row. Does nothing when the gate is closed;
    /// failures are logged and dropped.
    pub async fn record(
        &self,
        path: &str,
        remote_addr: &str,
        app_env: Option<&str>,
        message: Option<&str>,
    ) {
        if !self.gate.is_usable() {
            return;
        }

        let statement = InsertStatement::new("request_log", REQUEST_LOG_INSERT_SQL)
            .bind_text(Some(path))
            .bind_text(Some(remote_addr))
            .bind_text(app_env)
            .bind_text(message);

        let result = self
            .gate
            .with_connection(move |conn| Box::pin(async move { conn.execute(&statement).await }))
            .await;

        match result {
            Ok(rows) => debug!(rows, path, "request_log row written"),
            Err(e) => error!(
                error = %sanitize_message(&e.to_string()),
                path,
                "Failed to insert request_log row"
            ),
        }
    }
}
