//! Raidwatch Server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - HOST: Bind address (default: 0.0.0.0)
//! - PORT: Port number (default: 10000)
//! - POLL_INTERVAL_SECS: Seconds between feed polls (default: 30)
//! - HTTP_TIMEOUT_SECS: Timeout for outbound calls (default: 15)
//! - RUST_LOG: Log level (default: info)
//!
//! Alert feed:
//! - ALERTS_API_URL: Feed URL (default: alerts.in.ua active alerts)
//! - ALERTS_API_TOKEN: Feed token
//! - ALERTS_API_AUTH: `header` (Bearer, default) or `query` (?token=)
//! - REGION_NAME: Oblast substring to watch (default: Одеська)
//! - REGION_KEYWORDS: Comma-separated location titles narrowing the match
//!
//! Telegram:
//! - BOT_TOKEN, CHAT_ID: Bot credentials and target chat
//! - TELEGRAM_API_URL: Bot API base (default: https://api.telegram.org)
//! - ALERT_START_TEXT, ALERT_END_TEXT: Message templates
//!
//! Missing credentials are reported through /status and never stop the server.

use raidwatch::api::{run_server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raidwatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    tracing::info!("Raidwatch configuration:");
    tracing::info!("  Host: {}:{}", config.host, config.port);
    tracing::info!("  Poll interval: {:?}", config.poll_interval);
    tracing::info!("  Alert feed: {} (auth: {:?})", config.source.url, config.source.auth);
    tracing::info!("  Region: {}", config.region.name);
    if !config.region.keywords.is_empty() {
        tracing::info!("  Keywords: {}", config.region.keywords.join(", "));
    }
    tracing::info!("  Bot token set: {}", config.telegram.bot_token_set());
    tracing::info!("  Chat id set: {}", config.telegram.chat_id_set());

    println!(
        r#"
  raidwatch - air-raid alert watcher
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );

    run_server(config).await
}
