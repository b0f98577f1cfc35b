use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    check, health_check, home, ping, status, test_auto, test_off, test_on, AppState, ConfigInfo,
};
use crate::config::{env_duration_secs, env_parse, env_string, ConfigError};
use crate::monitor::{AlertWatcher, PollScheduler};
use crate::notify::{MessageTemplates, TelegramConfig, TelegramNotifier};
use crate::source::{AlertsClient, RegionMatcher, RegionSpec, SourceConfig};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub poll_interval: Duration,
    pub source: SourceConfig,
    pub telegram: TelegramConfig,
    pub region: RegionSpec,
    pub templates: MessageTemplates,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_string(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_parse(&lookup, "PORT", 10000),
            poll_interval: env_duration_secs(&lookup, "POLL_INTERVAL_SECS", 30),
            source: SourceConfig::from_vars(&lookup)?,
            telegram: TelegramConfig::from_vars(&lookup),
            region: RegionSpec::from_vars(&lookup),
            templates: MessageTemplates::from_vars(&lookup),
        })
    }

    pub fn info(&self) -> ConfigInfo {
        ConfigInfo {
            bot_token_set: self.telegram.bot_token_set(),
            chat_id_set: self.telegram.chat_id_set(),
            alerts_api_token_set: self.source.token_set(),
            poll_interval_secs: self.poll_interval.as_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            poll_interval: Duration::from_secs(30),
            source: SourceConfig::default(),
            telegram: TelegramConfig::default(),
            region: RegionSpec::default(),
            templates: MessageTemplates::default(),
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness
        .route("/", get(home))
        .route("/health", get(health_check))
        // Status and manual checks
        .route("/status", get(status))
        .route("/check", get(check))
        .route("/ping", get(ping))
        // Test overrides
        .route("/test/on", get(test_on))
        .route("/test/off", get(test_off))
        .route("/test/auto", get(test_auto))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server and the poll scheduler
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let info = config.info();
    if !info.bot_token_set || !info.chat_id_set {
        tracing::warn!("BOT_TOKEN or CHAT_ID not set; notifications will fail until configured");
    }
    if !info.alerts_api_token_set {
        tracing::warn!("ALERTS_API_TOKEN not set; the alert feed may reject requests");
    }

    let source = Arc::new(AlertsClient::new(config.source.clone())?);
    let sink = Arc::new(TelegramNotifier::new(config.telegram.clone())?);
    let watcher = Arc::new(AlertWatcher::new(
        source,
        sink,
        RegionMatcher::new(config.region.clone()),
        config.templates.clone(),
    ));

    // Start background polling
    let scheduler = Arc::new(PollScheduler::new(
        Arc::clone(&watcher),
        config.poll_interval,
    ));
    let scheduler_handle = Arc::clone(&scheduler).start();

    let state = Arc::new(AppState { watcher, info });
    let app = build_router(state);

    let listener = bind_listener(&config.host, config.port).await?;
    tracing::info!("Starting raidwatch server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&scheduler)))
        .await?;

    scheduler_handle.abort();

    tracing::info!("raidwatch server stopped");
    Ok(())
}

/// Binds `host:port`; `host` may be a hostname such as `localhost`
pub async fn bind_listener(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

async fn shutdown_signal(scheduler: Arc<PollScheduler>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received, stopping scheduler...");
    scheduler.stop();
}
