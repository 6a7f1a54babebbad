//! Chat Notifier
//!
//! Best-effort delivery of text messages to a single chat destination.

mod error;
mod telegram;

pub use error::NotifyError;
pub use telegram::{BotIdentity, TelegramNotifier, DEFAULT_API_URL};

use async_trait::async_trait;
use tracing::error;

/// Destination for outbound chat messages
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message; no retries
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Send `text` and log any failure with `context`
///
/// Returns whether the message was delivered. Failures never propagate.
pub async fn deliver<N: Notifier + ?Sized>(notifier: &N, text: &str, context: &str) -> bool {
    match notifier.send(text).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to send {} message: {}", context, e);
            false
        }
    }
}
