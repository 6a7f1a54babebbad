//! HTTP Alert Source
//!
//! Reads firing alerts from a Prometheus-compatible `/api/v1/alerts` endpoint.

use crate::error::SourceError;
use crate::AlertSource;
use alerting::{AlertRecord, AlertSnapshot};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default timeout for one alerts request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Response envelope of the alerts API
#[derive(Debug, Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: AlertsData,
}

#[derive(Debug, Default, Deserialize)]
struct AlertsData {
    #[serde(default)]
    alerts: Vec<AlertRecord>,
}

/// Decode an alerts API response body into a snapshot
pub fn parse_alerts(body: &str) -> Result<AlertSnapshot, SourceError> {
    let response: AlertsResponse = serde_json::from_str(body)?;
    match response.status.as_deref() {
        None | Some("success") => Ok(AlertSnapshot::new(response.data.alerts)),
        Some(other) => Err(SourceError::ApiStatus(other.to_string())),
    }
}

/// Alert source backed by an HTTP alerts endpoint
#[derive(Debug, Clone)]
pub struct HttpAlertSource {
    /// Full URL of the alerts endpoint
    url: String,
    /// HTTP client with the request timeout applied
    client: reqwest::Client,
}

impl HttpAlertSource {
    /// Create a source for `url` with the given request timeout
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SourceError> {
        info!("Creating alert source for {} (timeout {:?})", url, timeout);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_inner(&self) -> Result<AlertSnapshot, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.transport(e))?;
        parse_alerts(&body)
    }

    fn transport(&self, err: reqwest::Error) -> SourceError {
        SourceError::Transport {
            url: self.url.clone(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl AlertSource for HttpAlertSource {
    async fn fetch(&self) -> Result<AlertSnapshot, SourceError> {
        match self.fetch_inner().await {
            Ok(snapshot) => {
                debug!("Fetched {} firing alerts from {}", snapshot.len(), self.url);
                Ok(snapshot)
            }
            Err(e) => {
                error!("Failed to fetch alerts: {}", e);
                Err(e)
            }
        }
    }
}

/// Pre-flight reachability check against the alert source
///
/// Succeeds only on a 2xx answer within `timeout`.
pub async fn check_reachable(url: &str, timeout: Duration) -> Result<(), SourceError> {
    let transport = |e: reqwest::Error| SourceError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(transport)?;
    let response = client.get(url).send().await.map_err(transport)?;

    let status = response.status();
    if status.is_success() {
        info!("Alert source {} is reachable", url);
        Ok(())
    } else {
        error!("Alert source {} answered HTTP {}", url, status);
        Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_alerts_success() {
        let body = r#"{
            "status": "success",
            "data": {
                "alerts": [
                    {
                        "labels": {"alertname": "CPUHigh", "instance": "db1", "job": "node", "severity": "critical"},
                        "annotations": {"summary": "CPU above 90%"},
                        "state": "firing",
                        "activeAt": "2024-05-01T10:00:00Z",
                        "value": "95"
                    },
                    {
                        "labels": {"alertname": "DiskFull", "instance": "db2"},
                        "state": "firing"
                    }
                ]
            }
        }"#;

        let snapshot = parse_alerts(body).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.alerts()[0].name, "CPUHigh");
        assert_eq!(snapshot.alerts()[1].instance, "db2");
    }

    #[test]
    fn test_parse_empty_alerts() {
        let snapshot = parse_alerts(r#"{"status":"success","data":{"alerts":[]}}"#).unwrap();
        assert!(snapshot.is_empty());

        let snapshot = parse_alerts(r#"{"data":{}}"#).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_parse_error_status() {
        let result = parse_alerts(r#"{"status":"error","errorType":"timeout"}"#);
        assert!(matches!(result, Err(SourceError::ApiStatus(s)) if s == "error"));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_alerts("<html>"), Err(SourceError::Decode(_))));
        assert!(matches!(
            parse_alerts(r#"{"data":{"alerts":"nope"}}"#),
            Err(SourceError::Decode(_))
        ));
    }
}
