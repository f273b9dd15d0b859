use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    /// RFC 3339 time of the check.
    pub timestamp: String,
    pub uptime_secs: u64,
    pub environment: String,
}
