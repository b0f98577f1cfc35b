//! Tick orchestration around the alert state machine

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use super::state::{AlertState, NotificationEvent, OverrideMode};
use crate::notify::message::PING_TEXT;
use crate::notify::{MessageTemplates, NotificationSink, SendError};
use crate::source::{AlertSource, RegionMatcher};

/// Mutable state shared between the scheduler and request handlers
#[derive(Debug, Default)]
struct WatchState {
    alert: AlertState,
    override_mode: OverrideMode,
}

/// Read-only view of the watcher for status reporting
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub active: Option<bool>,
    pub active_since: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_poll_at: Option<DateTime<Utc>>,
    pub seconds_since_last_poll: Option<i64>,
    pub override_mode: OverrideMode,
}

/// Outcome of one tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub ok: bool,
    /// Value fed to the state machine, `None` if it could not be determined
    pub observed: Option<bool>,
    /// Whether `observed` came from an override
    pub forced: bool,
    pub event: Option<NotificationEvent>,
    pub sent: bool,
    pub error: Option<String>,
}

/// Outcome of changing the override mode
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideReport {
    pub override_mode: OverrideMode,
    pub forced: Option<bool>,
    pub sent: bool,
    pub tick: Option<TickReport>,
}

/// Owns the alert state and drives fetch → match → transition → notify
pub struct AlertWatcher {
    state: Mutex<WatchState>,
    /// Serializes whole ticks so edges are delivered in order
    tick_guard: tokio::sync::Mutex<()>,
    source: Arc<dyn AlertSource>,
    sink: Arc<dyn NotificationSink>,
    matcher: RegionMatcher,
    templates: MessageTemplates,
}

impl AlertWatcher {
    pub fn new(
        source: Arc<dyn AlertSource>,
        sink: Arc<dyn NotificationSink>,
        matcher: RegionMatcher,
        templates: MessageTemplates,
    ) -> Self {
        Self {
            state: Mutex::new(WatchState::default()),
            tick_guard: tokio::sync::Mutex::new(()),
            source,
            sink,
            matcher,
            templates,
        }
    }

    pub fn region(&self) -> &str {
        &self.matcher.spec().name
    }

    /// Run one tick using the wall clock at transition time
    pub async fn tick(&self) -> TickReport {
        self.run_tick(None).await
    }

    /// Run one tick with an explicit transition timestamp
    pub async fn tick_at(&self, now: DateTime<Utc>) -> TickReport {
        self.run_tick(Some(now)).await
    }

    async fn run_tick(&self, at: Option<DateTime<Utc>>) -> TickReport {
        let _guard = self.tick_guard.lock().await;
        self.tick_locked(at).await
    }

    /// Tick body; the caller must hold `tick_guard`
    async fn tick_locked(&self, at: Option<DateTime<Utc>>) -> TickReport {
        let mode = self.state.lock().override_mode;
        let observed = match mode.forced_value() {
            Some(forced) => forced,
            None => match self.source.fetch_snapshot().await {
                Ok(records) => self.matcher.matches(&records),
                Err(e) => {
                    let now = at.unwrap_or_else(Utc::now);
                    tracing::warn!(
                        error = %e,
                        auth_problem = e.is_auth_problem(),
                        "Alert fetch failed, keeping previous state"
                    );
                    self.state.lock().alert.record_error(e.to_string(), now);
                    return TickReport {
                        error: Some(e.to_string()),
                        ..TickReport::default()
                    };
                }
            },
        };

        let now = at.unwrap_or_else(Utc::now);
        let event = self.state.lock().alert.observe(observed, now);

        let mut report = TickReport {
            ok: true,
            observed: Some(observed),
            forced: mode != OverrideMode::Auto,
            event,
            ..TickReport::default()
        };

        match event {
            Some(event) => {
                tracing::info!(region = %self.region(), ?event, forced = report.forced, "Alert state changed");
                if let Err(e) = self.deliver(&event).await {
                    report.error = Some(e.to_string());
                } else {
                    report.sent = true;
                }
            }
            None => tracing::debug!(observed, forced = report.forced, "No state change"),
        }

        report
    }

    /// Send the rendered event. A failed delivery is not retried: the edge
    /// has already been consumed by the state machine.
    async fn deliver(&self, event: &NotificationEvent) -> Result<(), SendError> {
        let text = self.templates.render(event, self.region());
        self.sink.notify(&text).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to send notification");
            self.state
                .lock()
                .alert
                .record_delivery_error(format!("Notification not delivered: {}", e));
            e
        })
    }

    pub fn override_mode(&self) -> OverrideMode {
        self.state.lock().override_mode
    }

    /// Set the override and, when `apply` is set and the mode forces a value,
    /// push that value through the state machine immediately.
    ///
    /// The mode is written and the forced tick applied under the tick guard, so
    /// a concurrent override cannot swap the value in between.
    pub async fn set_override(&self, mode: OverrideMode, apply: bool) -> OverrideReport {
        let _guard = self.tick_guard.lock().await;
        self.state.lock().override_mode = mode;
        tracing::info!(?mode, apply, "Override mode set");

        let tick = if apply && mode != OverrideMode::Auto {
            Some(self.tick_locked(None).await)
        } else {
            None
        };

        OverrideReport {
            override_mode: mode,
            forced: tick
                .as_ref()
                .and_then(|t| t.observed)
                .or_else(|| mode.forced_value()),
            sent: tick.as_ref().map(|t| t.sent).unwrap_or(false),
            tick,
        }
    }

    /// Send a fixed test message without touching the state machine
    pub async fn ping(&self) -> Result<(), SendError> {
        self.sink.notify(PING_TEXT).await
    }

    /// Record an error raised outside the normal tick path
    pub fn record_error(&self, error: impl Into<String>) {
        self.state.lock().alert.record_error(error, Utc::now());
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshot_at(Utc::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> StatusSnapshot {
        let state = self.state.lock();
        let alert = &state.alert;
        StatusSnapshot {
            active: alert.active(),
            active_since: alert.active_since(),
            last_error: alert.last_error().map(String::from),
            last_poll_at: alert.last_poll_at(),
            seconds_since_last_poll: alert
                .last_poll_at()
                .map(|at| (now - at).num_seconds().max(0)),
            override_mode: state.override_mode,
        }
    }
}
