use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::record::{parse_snapshot, RawAlertRecord};
use super::AlertSource;
use crate::config::{env_duration_secs, env_string, ConfigError};
use crate::text::{truncate_chars, MAX_DIAGNOSTIC_CHARS};

pub const DEFAULT_ALERTS_API_URL: &str = "https://api.alerts.in.ua/v1/alerts/active.json";

/// How the feed token is attached to the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `Authorization: Bearer <token>`
    Header,
    /// `?token=<token>`
    Query,
}

impl std::str::FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "header" | "bearer" => Ok(AuthMode::Header),
            "query" => Ok(AuthMode::Query),
            other => Err(format!("unknown auth mode '{}'", other)),
        }
    }
}

/// Alert feed configuration
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: String,
    pub token: Option<String>,
    pub auth: AuthMode,
    pub timeout: Duration,
}

impl SourceConfig {
    /// Create a feed config from environment variables
    /// ALERTS_API_URL=https://api.alerts.in.ua/v1/alerts/active.json
    /// ALERTS_API_TOKEN=...
    /// ALERTS_API_AUTH=header|query
    /// HTTP_TIMEOUT_SECS=15
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = env_string(&lookup, "ALERTS_API_URL")
            .unwrap_or_else(|| DEFAULT_ALERTS_API_URL.to_string());
        let token = env_string(&lookup, "ALERTS_API_TOKEN");
        let auth = match env_string(&lookup, "ALERTS_API_AUTH") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "ALERTS_API_AUTH",
                value: raw,
            })?,
            None => AuthMode::Header,
        };
        let timeout = env_duration_secs(&lookup, "HTTP_TIMEOUT_SECS", 15);

        Ok(Self {
            url,
            token,
            auth,
            timeout,
        })
    }

    pub fn token_set(&self) -> bool {
        self.token.is_some()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ALERTS_API_URL.to_string(),
            token: None,
            auth: AuthMode::Header,
            timeout: Duration::from_secs(15),
        }
    }
}

/// HTTP client for the alert feed
#[derive(Debug, Clone)]
pub struct AlertsClient {
    http_client: reqwest::Client,
    config: SourceConfig,
}

impl AlertsClient {
    pub fn new(config: SourceConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Fetch and normalize one snapshot of active alerts
    pub async fn fetch(&self) -> Result<Vec<RawAlertRecord>, FetchError> {
        if self.config.url.is_empty() {
            return Err(FetchError::NotConfigured);
        }

        let mut request = self.http_client.get(&self.config.url);
        if let Some(token) = &self.config.token {
            request = match self.config.auth {
                AuthMode::Header => request.bearer_auth(token),
                AuthMode::Query => request.query(&[("token", token)]),
            };
        }

        let response = request.send().await.map_err(FetchError::from_reqwest)?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(FetchError::Unauthorized {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(FetchError::from_reqwest)?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_DIAGNOSTIC_CHARS),
            });
        }

        parse_snapshot(&body)
    }
}

#[async_trait]
impl AlertSource for AlertsClient {
    async fn fetch_snapshot(&self) -> Result<Vec<RawAlertRecord>, FetchError> {
        self.fetch().await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Alert feed URL is not configured")]
    NotConfigured,

    #[error("Alerts API HTTP {status}: API token required (set ALERTS_API_TOKEN)")]
    Unauthorized { status: u16 },

    #[error("Alerts API HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Alerts API request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(e.to_string())
        }
    }

    /// Configuration or credential problem rather than a transient one
    pub fn is_auth_problem(&self) -> bool {
        matches!(
            self,
            FetchError::NotConfigured | FetchError::Unauthorized { .. }
        )
    }
}
