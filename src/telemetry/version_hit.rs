//! Version-hit telemetry. Never fails; the returned outcome says whether
//! the row was written and, if not, why.

use std::sync::Arc;
use tracing::{debug, error};

use crate::database::{ConnectionGate, InsertStatement};
use crate::outcome::{sanitize_message, DbOutcome};

pub const VERSION_HIT_INSERT_SQL: &str = "INSERT INTO version_hit \
     (version, app_version, release_number, request_id, user_agent) \
     VALUES ($1, $2, $3, $4, $5)";

/// One `version_hit` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionHit<'a> {
    pub version: i32,
    pub app_version: Option<&'a str>,
    pub release_number: i32,
    pub request_id: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

impl VersionHit<'_> {
    fn statement(&self) -> InsertStatement {
        InsertStatement::new("version_hit", VERSION_HIT_INSERT_SQL)
            .bind_int(self.version)
            .bind_text(self.app_version)
            .bind_int(self.release_number)
            .bind_text(self.request_id)
            .bind_text(self.user_agent)
    }
}

#[derive(Debug, Clone)]
pub struct VersionHitWriter {
    gate: Arc<ConnectionGate>,
}

impl VersionHitWriter {
    pub fn new(gate: Arc<ConnectionGate>) -> Self {
        Self { gate }
    }

    pub async fn record(
        &self,
        version: i32,
        app_version: &str,
        release_number: i32,
        request_id: &str,
        user_agent: Option<&str>,
    ) -> DbOutcome {
        self.record_hit(&VersionHit {
            version,
            app_version: Some(app_version),
            release_number,
            request_id: Some(request_id),
            user_agent,
        })
        .await
    }

    pub async fn record_hit(&self, hit: &VersionHit<'_>) -> DbOutcome {
        if let Some(outcome) = self.gate.state().skip_outcome() {
            debug!(
                outcome = outcome.status_label(),
                version = hit.version,
                "Skipping version_hit write"
            );
            return outcome;
        }

        let statement = hit.statement();
        let result = self
            .gate
            .with_connection(move |conn| Box::pin(async move { conn.execute(&statement).await }))
            .await;

        match result {
            Ok(rows) => {
                debug!(rows, version = hit.version, "version_hit row written");
                DbOutcome::ok()
            }
            Err(e) => {
                error!(
                    error = %sanitize_message(&e.to_string()),
                    version = hit.version,
                    "Failed to insert version_hit row"
                );
                DbOutcome::write_failure(&e)
            }
        }
    }
}
