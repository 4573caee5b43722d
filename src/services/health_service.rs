use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the snapshot store, reporting `degraded` when it cannot be reached.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded(err.to_string())
        }
    }
}
