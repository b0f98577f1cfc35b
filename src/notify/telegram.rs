//! Telegram Bot API sink

use async_trait::async_trait;
use std::time::Duration;

use super::NotificationSink;
use crate::config::{env_duration_secs, env_string};
use crate::text::{truncate_chars, MAX_DIAGNOSTIC_CHARS};

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Telegram bot configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub timeout: Duration,
}

impl TelegramConfig {
    /// Create a Telegram config from environment variables
    /// BOT_TOKEN=123456:ABC...
    /// CHAT_ID=-1001234567890
    /// TELEGRAM_API_URL=https://api.telegram.org
    /// HTTP_TIMEOUT_SECS=15
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: env_string(&lookup, "TELEGRAM_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            bot_token: env_string(&lookup, "BOT_TOKEN"),
            chat_id: env_string(&lookup, "CHAT_ID"),
            timeout: env_duration_secs(&lookup, "HTTP_TIMEOUT_SECS", 15),
        }
    }

    pub fn bot_token_set(&self) -> bool {
        self.bot_token.is_some()
    }

    pub fn chat_id_set(&self) -> bool {
        self.chat_id.is_some()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            bot_token: None,
            chat_id: None,
            timeout: Duration::from_secs(15),
        }
    }
}

/// Sends messages through the Bot API `sendMessage` method
pub struct TelegramNotifier {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Send one message to the configured chat
    pub async fn send_message(&self, text: &str) -> Result<(), SendError> {
        let token = self
            .config
            .bot_token
            .as_deref()
            .ok_or(SendError::NotConfigured("BOT_TOKEN is empty"))?;
        let chat_id = self
            .config
            .chat_id
            .as_deref()
            .ok_or(SendError::NotConfigured("CHAT_ID is empty"))?;

        let url = format!("{}/bot{}/sendMessage", self.config.api_url, token);
        let response = self
            .client
            .post(&url)
            .form(&[("chat_id", chat_id), ("text", text)])
            .send()
            .await
            .map_err(SendError::from_reqwest)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(SendError::from_reqwest)?;

        check_ack(status, &body)?;

        tracing::debug!(chat_id = %chat_id, "Telegram message sent");
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), SendError> {
        self.send_message(text).await
    }
}

/// Accept only a 2xx response whose JSON body carries `"ok": true`
fn check_ack(status: u16, body: &str) -> Result<(), SendError> {
    let acknowledged = (200..300).contains(&status)
        && serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("ok").and_then(serde_json::Value::as_bool))
            .unwrap_or(false);

    if acknowledged {
        Ok(())
    } else {
        Err(SendError::Rejected {
            status,
            payload: truncate_chars(body, MAX_DIAGNOSTIC_CHARS),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Telegram not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Telegram rejected message (HTTP {status}): {payload}")]
    Rejected { status: u16, payload: String },

    #[error("Telegram request timed out")]
    Timeout,

    #[error("Telegram send error: {0}")]
    Network(String),
}

impl SendError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SendError::Timeout
        } else {
            SendError::Network(e.to_string())
        }
    }
}
