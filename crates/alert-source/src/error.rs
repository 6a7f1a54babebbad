//! Alert Source Error Types

use thiserror::Error;

/// Errors that can occur while fetching alerts
#[derive(Debug, Error)]
pub enum SourceError {
    /// Connection, timeout or body read failure
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Alerts API answered with a non-success HTTP status
    #[error("Alerts API at {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Response body is not a valid alerts payload
    #[error("Malformed alerts payload: {0}")]
    Decode(String),

    /// Payload parsed but reports a failed query
    #[error("Alerts API reported status {0:?}")]
    ApiStatus(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}
