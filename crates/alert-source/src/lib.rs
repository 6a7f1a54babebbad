//! Alert Source
//!
//! Fetches snapshots of currently firing alerts. Every failure is logged
//! where it happens and returned to the caller, which decides how a failed
//! fetch affects notification state.

mod client;
mod error;

pub use client::{check_reachable, parse_alerts, HttpAlertSource, DEFAULT_TIMEOUT};
pub use error::SourceError;

use alerting::AlertSnapshot;
use async_trait::async_trait;

/// Provider of firing-alert snapshots
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Fetch the complete set of currently firing alerts
    async fn fetch(&self) -> Result<AlertSnapshot, SourceError>;
}
