//! Alert Model
//!
//! Alerts as reported by the monitoring API, one record per firing alert.

use serde::Deserialize;
use std::fmt;

/// One firing alert as observed at fetch time
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawAlert")]
pub struct AlertRecord {
    /// Alert rule identifier (`alertname` label)
    pub name: String,
    /// Target host or service
    pub instance: String,
    /// Scrape job label
    pub job: String,
    /// Severity label
    pub severity: String,
    /// Alert state, e.g. "firing" or "pending"
    pub state: String,
    /// Short human text
    pub summary: String,
    /// Long human text
    pub description: String,
    /// When the alert started firing, as reported by the source
    pub active_since: String,
    /// Sample value that triggered the alert, if reported
    pub value: Option<String>,
}

impl AlertRecord {
    /// Identity used for repeat suppression
    pub fn key(&self) -> AlertKey {
        AlertKey::new(&self.name, &self.instance)
    }
}

/// Wire shape of a single alert in the monitoring API response
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAlert {
    labels: RawLabels,
    annotations: RawAnnotations,
    state: String,
    active_at: String,
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLabels {
    alertname: String,
    instance: String,
    job: String,
    severity: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnnotations {
    summary: String,
    description: String,
}

impl From<RawAlert> for AlertRecord {
    fn from(raw: RawAlert) -> Self {
        Self {
            name: raw.labels.alertname,
            instance: raw.labels.instance,
            job: raw.labels.job,
            severity: raw.labels.severity,
            state: raw.state,
            summary: raw.annotations.summary,
            description: raw.annotations.description,
            active_since: raw.active_at,
            value: raw.value,
        }
    }
}

/// Dedup identity of an alert: rule name plus instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertKey {
    name: String,
    instance: String,
}

impl AlertKey {
    /// Create a key from its parts
    pub fn new(name: &str, instance: &str) -> Self {
        Self {
            name: name.to_string(),
            instance: instance.to_string(),
        }
    }

    /// Alert rule name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alert instance
    pub fn instance(&self) -> &str {
        &self.instance
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.instance)
    }
}

/// Complete set of firing alerts returned by one fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertSnapshot {
    alerts: Vec<AlertRecord>,
}

impl AlertSnapshot {
    /// Wrap the alerts of one fetch
    pub fn new(alerts: Vec<AlertRecord>) -> Self {
        Self { alerts }
    }

    /// Snapshot with no firing alerts
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlertRecord> {
        self.alerts.iter()
    }

    /// Borrow the alerts in fetch order
    pub fn alerts(&self) -> &[AlertRecord] {
        &self.alerts
    }
}

impl From<Vec<AlertRecord>> for AlertSnapshot {
    fn from(alerts: Vec<AlertRecord>) -> Self {
        Self::new(alerts)
    }
}

impl<'a> IntoIterator for &'a AlertSnapshot {
    type Item = &'a AlertRecord;
    type IntoIter = std::slice::Iter<'a, AlertRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.iter()
    }
}
