// HTTP telemetry source - polls the weather backend's JSON endpoints
use crate::application::telemetry_source::TelemetrySource;
use crate::domain::telemetry::TelemetryRecord;
use crate::error::{DashboardError, Feed};
use crate::infrastructure::config::SourceSettings;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpTelemetrySource {
    client: reqwest::Client,
    base_url: String,
    current_path: String,
    history_path: String,
    history_hours: Option<u32>,
}

impl HttpTelemetrySource {
    pub fn new(settings: &SourceSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            current_path: settings.current_path.clone(),
            history_path: settings.history_path.clone(),
            history_hours: settings.history_hours,
        })
    }

    fn current_url(&self) -> String {
        format!("{}{}", self.base_url, self.current_path)
    }

    /// History URL, with an explicit `start`/`end` window when one is configured.
    fn history_url(&self, now: DateTime<Utc>) -> String {
        let url = format!("{}{}", self.base_url, self.history_path);
        match self.history_hours {
            None => url,
            Some(hours) => {
                let start = now - chrono::Duration::hours(i64::from(hours));
                format!(
                    "{}?start={}&end={}",
                    url,
                    urlencoding::encode(&start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                    urlencoding::encode(&now.to_rfc3339_opts(SecondsFormat::Secs, true))
                )
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, feed: Feed, url: &str) -> Result<T, DashboardError> {
        let fetch_error = |reason: String| DashboardError::Fetch { feed, reason };

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(fetch_error(format!("status {}: {}", status, body.trim())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        decode_payload(feed, &body)
    }
}

fn decode_payload<T: DeserializeOwned>(feed: Feed, body: &[u8]) -> Result<T, DashboardError> {
    serde_json::from_slice(body).map_err(|e| DashboardError::Decode {
        feed,
        reason: e.to_string(),
    })
}

#[async_trait]
impl TelemetrySource for HttpTelemetrySource {
    async fn fetch_current(&self) -> Result<TelemetryRecord, DashboardError> {
        let url = self.current_url();
        tracing::debug!("GET {}", url);
        self.get_json(Feed::Current, &url).await
    }

    async fn fetch_history(&self) -> Result<Vec<TelemetryRecord>, DashboardError> {
        let url = self.history_url(Utc::now());
        tracing::debug!("GET {}", url);
        let records: Vec<TelemetryRecord> = self.get_json(Feed::History, &url).await?;
        tracing::debug!("History feed returned {} records", records.len());
        Ok(records)
    }
}
