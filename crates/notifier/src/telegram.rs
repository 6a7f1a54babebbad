//! Telegram Bot API Notifier

use crate::error::NotifyError;
use crate::Notifier;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Public Telegram Bot API endpoint
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Envelope wrapping every Bot API answer
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

/// `sendMessage` request body
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
}

/// Account the bot token belongs to, as returned by `getMe`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Sends Markdown messages to a single Telegram chat
#[derive(Clone)]
pub struct TelegramNotifier {
    /// Bot API base URL, without trailing slash
    api_url: String,
    /// Bot token; never logged
    token: String,
    /// Destination chat
    chat_id: i64,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Create a notifier for `chat_id`
    pub fn new(
        api_url: &str,
        token: &str,
        chat_id: i64,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        info!("Creating Telegram notifier for chat {}", chat_id);

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id,
            client,
        })
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// Validate the token and fetch the bot account
    pub async fn identify(&self) -> Result<BotIdentity, NotifyError> {
        let response = self.client.get(self.method_url("getMe")).send().await?;
        let identity: BotIdentity = Self::read_result(response).await?;
        info!(
            "Authorized on account {}",
            identity.username.as_deref().unwrap_or(&identity.first_name)
        );
        Ok(identity)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn read_result<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, NotifyError> {
        let status = response.status().as_u16();
        let body = response.text().await?;

        let parsed: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| NotifyError::Decode {
                status,
                message: e.to_string(),
            })?;

        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { ok: true, .. } => Err(NotifyError::Decode {
                status,
                message: "missing result".to_string(),
            }),
            ApiResponse {
                error_code,
                description,
                ..
            } => Err(NotifyError::Api {
                code: error_code.unwrap_or(i64::from(status)),
                description: description.unwrap_or_default(),
            }),
        }
    }
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: self.chat_id,
            text,
            parse_mode: "Markdown",
        };
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        let _: serde_json::Value = Self::read_result(response).await?;
        debug!("Message delivered to chat {}", self.chat_id);
        Ok(())
    }
}
