use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::monitor::{AlertWatcher, OverrideMode, OverrideReport, StatusSnapshot, TickReport};
use crate::notify::SendError;

/// Application state shared across handlers
pub struct AppState {
    pub watcher: Arc<AlertWatcher>,
    pub info: ConfigInfo,
}

/// Which credentials were present at startup
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInfo {
    pub bot_token_set: bool,
    pub chat_id_set: bool,
    pub alerts_api_token_set: bool,
    pub poll_interval_secs: u64,
}

// ============================================================================
// Liveness
// ============================================================================

pub async fn home() -> &'static str {
    "Bot is alive"
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Status
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    pub region: String,
    #[serde(flatten)]
    pub config: ConfigInfo,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        snapshot: state.watcher.snapshot(),
        region: state.watcher.region().to_string(),
        config: state.info.clone(),
    })
}

// ============================================================================
// Manual checks
// ============================================================================

pub async fn check(State(state): State<Arc<AppState>>) -> Json<TickReport> {
    Json(state.watcher.tick().await)
}

#[derive(Serialize)]
pub struct PingResponse {
    pub ok: bool,
    pub error: Option<String>,
}

pub async fn ping(State(state): State<Arc<AppState>>) -> Result<Json<PingResponse>, ApiError> {
    state.watcher.ping().await.map_err(ApiError::from)?;
    Ok(Json(PingResponse {
        ok: true,
        error: None,
    }))
}

// ============================================================================
// Test overrides
// ============================================================================

#[derive(Deserialize)]
pub struct OverrideParams {
    /// Run a tick with the forced value right away (default true)
    pub apply: Option<bool>,
}

pub async fn test_on(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OverrideParams>,
) -> Json<OverrideReport> {
    set_override(&state, OverrideMode::ForcedActive, params.apply.unwrap_or(true)).await
}

pub async fn test_off(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OverrideParams>,
) -> Json<OverrideReport> {
    set_override(&state, OverrideMode::ForcedClear, params.apply.unwrap_or(true)).await
}

pub async fn test_auto(State(state): State<Arc<AppState>>) -> Json<OverrideReport> {
    set_override(&state, OverrideMode::Auto, false).await
}

async fn set_override(state: &AppState, mode: OverrideMode, apply: bool) -> Json<OverrideReport> {
    Json(state.watcher.set_override(mode, apply).await)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotConfigured(String),
    Upstream(String),
}

impl From<SendError> for ApiError {
    fn from(e: SendError) -> Self {
        match e {
            SendError::NotConfigured(_) => ApiError::NotConfigured(e.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotConfigured(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = serde_json::json!({
            "ok": false,
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
