//! Trait for the source of station readings and history.

use anyhow::Result;

use crate::model::{HistoricalDataPoint, HistoryWindow, Station};

/// Abstraction over the portal backend's station endpoints.
#[async_trait::async_trait]
pub trait StationRepository: Send + Sync {
    /// Returns every station with its latest readings.
    async fn fetch_stations(&self) -> Result<Vec<Station>>;

    /// Returns the history for `sensor_id`, oldest first. The ordering is
    /// the backend's responsibility and is not re-checked here.
    async fn fetch_history(
        &self,
        sensor_id: &str,
        window: HistoryWindow,
    ) -> Result<Vec<HistoricalDataPoint>>;
}
