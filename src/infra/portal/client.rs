use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info};

use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, get_json, post_json};
use crate::forms::{AlertSubscription, FeedbackSubmission};
use crate::infra::config::PortalConfig;
use crate::model::{HistoricalDataPoint, HistoryWindow, Station, stations_from_records};
use crate::services::{FormsApi, StationRepository};

/// REST client for the air-quality portal backend.
pub struct PortalClient<C> {
    http: C,
    base_url: Url,
}

impl PortalClient<Box<dyn HttpClient>> {
    /// Builds a client from config, adding the API key header when one is set.
    pub fn from_config(config: &PortalConfig) -> Result<Self> {
        let basic = BasicClient::new(config.timeout)?;
        let http: Box<dyn HttpClient> = match (&config.api_key, &config.api_key_header) {
            (Some(key), Some(header)) => Box::new(ApiKey::new(basic, header, key)?),
            (Some(key), None) => Box::new(ApiKey::bearer(basic, key)?),
            (None, _) => Box::new(basic),
        };
        Self::new(http, &config.base_url)
    }
}

impl<C: HttpClient> PortalClient<C> {
    pub fn new(http: C, base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid base URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("base URL '{base_url}' cannot have path segments"));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path. Segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn stations_url(&self) -> Url {
        self.endpoint(&["stations"])
    }

    pub fn history_url(&self, sensor_id: &str, window: HistoryWindow) -> Url {
        let mut url = self.endpoint(&["stations", sensor_id, "readings"]);
        url.query_pairs_mut()
            .append_pair("range", &window.range_hours().to_string())
            .append_pair("direction", "asc")
            .append_pair("sort", "timeStamp");
        url
    }
}

#[async_trait]
impl<C: HttpClient> StationRepository for PortalClient<C> {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_stations(&self) -> Result<Vec<Station>> {
        let records: Vec<Value> = get_json(&self.http, self.stations_url()).await?;
        let received = records.len();
        let stations: Vec<Station> = stations_from_records(records)
            .into_iter()
            .map(Station::normalized)
            .collect();
        info!(
            count = stations.len(),
            skipped = received - stations.len(),
            "Stations fetched"
        );
        Ok(stations)
    }

    #[tracing::instrument(skip(self), fields(range_hours = window.range_hours()))]
    async fn fetch_history(
        &self,
        sensor_id: &str,
        window: HistoryWindow,
    ) -> Result<Vec<HistoricalDataPoint>> {
        let points: Vec<HistoricalDataPoint> =
            get_json(&self.http, self.history_url(sensor_id, window)).await?;
        debug!(points = points.len(), "History fetched");
        Ok(points)
    }
}

#[async_trait]
impl<C: HttpClient> FormsApi for PortalClient<C> {
    #[tracing::instrument(skip_all, fields(sensors = subscription.sensors.len()))]
    async fn subscribe(&self, subscription: &AlertSubscription) -> Result<Value> {
        let url = self.endpoint(&["alerts", "users"]);
        post_json(&self.http, url, Some(subscription)).await
    }

    #[tracing::instrument(skip(self))]
    async fn unsubscribe(&self, id: &str) -> Result<Value> {
        let url = self.endpoint(&["alerts", "users", id, "unsubscribe"]);
        post_json::<_, (), _>(&self.http, url, None).await
    }

    #[tracing::instrument(skip_all, fields(rating = feedback.rating))]
    async fn submit_feedback(&self, feedback: &FeedbackSubmission) -> Result<Value> {
        let url = self.endpoint(&["feedback"]);
        post_json(&self.http, url, Some(feedback)).await
    }
}
