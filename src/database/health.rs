//! # Telemetry Database Health
//!
//! Lightweight liveness check for API health reporting. Best-effort: it
//! never fails, it reports.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::gate::ConnectionGate;
use crate::error::DbError;
use crate::outcome::DbOutcome;

pub const VALIDITY_CHECK_FAILED_WARNING: &str = "DB connection opened but validity check failed.";

#[derive(Debug, Clone)]
pub struct DbHealth {
    gate: Arc<ConnectionGate>,
}

impl DbHealth {
    pub fn new(gate: Arc<ConnectionGate>) -> Self {
        Self { gate }
    }

    /// Disabled, config warning, driver warning, or a probe on a fresh
    /// connection, whichever applies first.
    pub async fn check(&self) -> DbOutcome {
        if let Some(outcome) = self.gate.state().skip_outcome() {
            return outcome;
        }

        let timeout = self.gate.settings().validity_timeout;
        let probe = self
            .gate
            .with_connection(move |conn| {
                Box::pin(async move {
                    match tokio::time::timeout(timeout, conn.ping()).await {
                        Ok(Ok(())) => Ok(true),
                        Ok(Err(e)) => {
                            debug!(error = %e, "Validity probe could not confirm connection");
                            Ok(false)
                        }
                        Err(_) => Err(validity_timeout_error(timeout)),
                    }
                })
            })
            .await;

        match probe {
            Ok(true) => DbOutcome::ok(),
            Ok(false) => DbOutcome::warn(VALIDITY_CHECK_FAILED_WARNING),
            Err(e) => {
                warn!(error = %e, "Telemetry database connectivity check failed");
                DbOutcome::connectivity_failure(&e)
            }
        }
    }
}

fn validity_timeout_error(timeout: Duration) -> DbError {
    DbError::Connectivity(format!(
        "validity check timed out after {}s",
        timeout.as_secs_f64()
    ))
}
