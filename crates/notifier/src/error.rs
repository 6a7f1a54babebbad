//! Notifier Error Types

use thiserror::Error;

/// Errors that can occur while delivering a chat message
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Connection, timeout or body read failure
    #[error("Chat API request failed: {0}")]
    Transport(String),

    /// Chat API rejected the request
    #[error("Chat API error {code}: {description}")]
    Api { code: i64, description: String },

    /// Chat API answered with something that is not a valid response
    #[error("Unexpected chat API response (HTTP {status}): {message}")]
    Decode { status: u16, message: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors carry the request URL, which embeds the bot token
        NotifyError::Transport(err.without_url().to_string())
    }
}
