// Source trait for the two telemetry feeds
use crate::domain::telemetry::TelemetryRecord;
use crate::error::DashboardError;
use async_trait::async_trait;

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Most recent single reading
    async fn fetch_current(&self) -> Result<TelemetryRecord, DashboardError>;

    /// Past readings, oldest first
    async fn fetch_history(&self) -> Result<Vec<TelemetryRecord>, DashboardError>;
}
