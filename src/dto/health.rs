use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

/// Overall verdict of a health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// The snapshot store answered.
    Ok,
    /// The service is up but the snapshot store is unreachable; mutations will fail.
    Degraded,
}

/// Body of the `/healthcheck` route.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall verdict.
    pub status: HealthStatus,
    /// Store failure behind a `degraded` verdict.
    pub storage_error: Option<String>,
}

impl HealthResponse {
    /// Snapshot store reachable.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
            storage_error: None,
        }
    }

    /// Snapshot store unreachable for the given reason.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            storage_error: Some(reason.into()),
        }
    }
}
