use async_trait::async_trait;
use oncall_common::{Monitor, MonitorMessage, Result, SyncError};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::traits::MonitorStore;

const SERVICE: &str = "Datadog";

/// Monitor as returned by `GET /api/v1/monitor`, reduced to what we read
#[derive(Debug, Clone, Deserialize)]
pub struct DatadogMonitor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub message: String,
}

impl DatadogMonitor {
    pub fn into_monitor(self) -> Result<Monitor> {
        let decoded = MonitorMessage::decode(&self.message).map_err(|e| {
            SyncError::decode(format!("monitor {} ({}): {}", self.id, self.name, e))
        })?;

        Ok(Monitor {
            id: self.id,
            name: self.name,
            description: decoded.description,
            contributors: decoded.contributors,
        })
    }
}

#[derive(Debug, Serialize)]
struct UpdateMonitorRequest<'a> {
    message: &'a str,
}

/// Datadog monitor API client
pub struct DatadogClient {
    client: Client,
    base_url: String,
    api_key: String,
    app_key: String,
}

impl DatadogClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| {
                SyncError::transport(SERVICE, format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            app_key: app_key.into(),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("DD-API-KEY", &self.api_key)
            .header("DD-APPLICATION-KEY", &self.app_key)
    }
}

/// Turn a non-success status into an API error carrying the response body
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!("Datadog API returned status {}: {}", status, body);
    Err(SyncError::Api {
        service: SERVICE.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl MonitorStore for DatadogClient {
    async fn fetch_monitors(&self, tag: &str) -> Result<Vec<Monitor>> {
        debug!("Fetching Datadog monitors tagged {}", tag);

        let response = self
            .authorize(self.client.get(format!("{}/api/v1/monitor", self.base_url)))
            .query(&[("monitor_tags", tag)])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send Datadog monitor query: {}", e);
                SyncError::transport(SERVICE, e)
            })?;

        let monitors: Vec<DatadogMonitor> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::decode(format!("invalid Datadog monitor list: {}", e)))?;

        debug!("Datadog returned {} monitors", monitors.len());
        monitors
            .into_iter()
            .map(DatadogMonitor::into_monitor)
            .collect()
    }

    async fn update_monitor(&self, id: i64, message: &str) -> Result<()> {
        debug!("Updating Datadog monitor {}", id);

        let response = self
            .authorize(self.client.put(format!("{}/api/v1/monitor/{}", self.base_url, id)))
            .json(&UpdateMonitorRequest { message })
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send Datadog monitor update: {}", e);
                SyncError::transport(SERVICE, e)
            })?;

        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_into_monitor_decodes_message() {
        let raw: DatadogMonitor = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "API latency",
            "type": "metric alert",
            "message": "p99 too high\n\n---\n\n{\"@alice\":5}\n\n---\n\n@slack-alerts <@U1>"
        }))
        .unwrap();

        let monitor = raw.into_monitor().unwrap();

        assert_eq!(monitor.id, 7);
        assert_eq!(monitor.description, "p99 too high");
        assert_eq!(monitor.contributors.get("@alice"), Some(5));
    }

    #[test]
    fn test_into_monitor_names_monitor_on_bad_state() {
        let raw = DatadogMonitor {
            id: 9,
            name: "Broken".to_string(),
            message: "desc --- {oops".to_string(),
        };

        let err = raw.into_monitor().unwrap_err();

        assert!(err.to_string().contains("monitor 9 (Broken)"));
    }
}
