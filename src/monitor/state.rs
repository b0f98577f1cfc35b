//! Alert state machine
//!
//! ```text
//!            observe(false)                 observe(true) / AlarmStart
//!  Unknown ─────────────────► Clear ─────────────────────────────► Active
//!     │                         ▲                                    │
//!     │ observe(true)           └──── observe(false) / AlarmEnd ─────┘
//!     └───────────────────────────────────────────────────────────► Active
//! ```
//!
//! The first observation after startup only seeds the state, so a restart
//! never re-announces an alert that was already in progress.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Observed phase of the watched region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPhase {
    /// No successful observation yet
    #[default]
    Unknown,
    Clear,
    Active,
}

/// Manual substitute for the fetched observation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideMode {
    #[default]
    Auto,
    ForcedActive,
    ForcedClear,
}

impl OverrideMode {
    /// The observation this mode substitutes, or `None` for [`OverrideMode::Auto`]
    pub fn forced_value(self) -> Option<bool> {
        match self {
            OverrideMode::Auto => None,
            OverrideMode::ForcedActive => Some(true),
            OverrideMode::ForcedClear => Some(false),
        }
    }
}

/// Edge emitted by [`AlertState::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum NotificationEvent {
    #[serde(rename_all = "camelCase")]
    AlarmStart { timestamp: DateTime<Utc> },
    #[serde(rename_all = "camelCase")]
    AlarmEnd {
        timestamp: DateTime<Utc>,
        duration_seconds: i64,
    },
}

impl NotificationEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            NotificationEvent::AlarmStart { timestamp }
            | NotificationEvent::AlarmEnd { timestamp, .. } => *timestamp,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, NotificationEvent::AlarmStart { .. })
    }
}

/// Current alert state of the watched region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    phase: AlertPhase,
    /// Set exactly when `phase == Active`
    active_since: Option<DateTime<Utc>>,
    last_error: Option<String>,
    last_poll_at: Option<DateTime<Utc>>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AlertPhase {
        self.phase
    }

    /// `None` until the first successful observation
    pub fn active(&self) -> Option<bool> {
        match self.phase {
            AlertPhase::Unknown => None,
            AlertPhase::Clear => Some(false),
            AlertPhase::Active => Some(true),
        }
    }

    pub fn active_since(&self) -> Option<DateTime<Utc>> {
        self.active_since
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_poll_at(&self) -> Option<DateTime<Utc>> {
        self.last_poll_at
    }

    /// Apply one fully resolved observation and return the edge, if any
    pub fn observe(&mut self, observed: bool, now: DateTime<Utc>) -> Option<NotificationEvent> {
        self.last_poll_at = Some(now);
        self.last_error = None;

        match (self.phase, observed) {
            (AlertPhase::Unknown, false) => {
                self.phase = AlertPhase::Clear;
                self.active_since = None;
                None
            }
            (AlertPhase::Unknown, true) => {
                self.phase = AlertPhase::Active;
                self.active_since = Some(now);
                None
            }
            (AlertPhase::Clear, false) | (AlertPhase::Active, true) => None,
            (AlertPhase::Clear, true) => {
                self.phase = AlertPhase::Active;
                self.active_since = Some(now);
                Some(NotificationEvent::AlarmStart { timestamp: now })
            }
            (AlertPhase::Active, false) => {
                let duration_seconds = self
                    .active_since
                    .take()
                    .map(|since| (now - since).num_seconds().max(0))
                    .unwrap_or(0);
                self.phase = AlertPhase::Clear;
                Some(NotificationEvent::AlarmEnd {
                    timestamp: now,
                    duration_seconds,
                })
            }
        }
    }

    /// Record a failed poll; the phase and `active_since` are left untouched
    pub fn record_error(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        self.last_error = Some(error.into());
        self.last_poll_at = Some(now);
    }

    /// Record a failure that happened after the transition was applied
    pub fn record_delivery_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn run(observations: &[(i64, bool)]) -> (AlertState, Vec<NotificationEvent>) {
        let mut state = AlertState::new();
        let events = observations
            .iter()
            .filter_map(|(secs, observed)| state.observe(*observed, t(*secs)))
            .collect();
        (state, events)
    }

    #[test]
    fn test_first_observation_is_silent() {
        let (state, events) = run(&[(0, false)]);
        assert!(events.is_empty());
        assert_eq!(state.phase(), AlertPhase::Clear);
        assert_eq!(state.active_since(), None);

        let (state, events) = run(&[(0, true)]);
        assert!(events.is_empty());
        assert_eq!(state.phase(), AlertPhase::Active);
        assert_eq!(state.active_since(), Some(t(0)));
    }

    #[test]
    fn test_unknown_reports_no_active_value() {
        let state = AlertState::new();
        assert_eq!(state.active(), None);
        assert_eq!(state.last_poll_at(), None);
    }

    #[test]
    fn test_single_alarm_cycle() {
        let (state, events) = run(&[(0, false), (30, false), (60, true), (90, true), (120, false)]);

        assert_eq!(
            events,
            vec![
                NotificationEvent::AlarmStart { timestamp: t(60) },
                NotificationEvent::AlarmEnd {
                    timestamp: t(120),
                    duration_seconds: 60
                },
            ]
        );
        assert_eq!(state.active(), Some(false));
        assert_eq!(state.active_since(), None);
    }

    #[test]
    fn test_events_match_edges_exactly() {
        let pattern = [
            false, true, true, true, false, false, true, false, true, true, false, false, false,
        ];
        let observations: Vec<(i64, bool)> = pattern
            .iter()
            .enumerate()
            .map(|(i, v)| (i as i64 * 30, *v))
            .collect();
        let (_, events) = run(&observations);

        let rising = pattern.windows(2).filter(|w| !w[0] && w[1]).count();
        let falling = pattern.windows(2).filter(|w| w[0] && !w[1]).count();

        assert_eq!(events.iter().filter(|e| e.is_start()).count(), rising);
        assert_eq!(events.iter().filter(|e| !e.is_start()).count(), falling);
    }

    #[test]
    fn test_startup_during_alarm_still_reports_end() {
        let (_, events) = run(&[(0, true), (30, true), (90, false)]);
        assert_eq!(
            events,
            vec![NotificationEvent::AlarmEnd {
                timestamp: t(90),
                duration_seconds: 90
            }]
        );
    }

    #[test]
    fn test_error_preserves_active_period() {
        let mut state = AlertState::new();
        state.observe(false, t(0));
        assert!(state.observe(true, t(30)).is_some());

        state.record_error("Network error: connection reset", t(60));
        state.record_error("Alerts API request timed out", t(90));
        assert_eq!(state.phase(), AlertPhase::Active);
        assert_eq!(state.active_since(), Some(t(30)));
        assert_eq!(state.last_error(), Some("Alerts API request timed out"));
        assert_eq!(state.last_poll_at(), Some(t(90)));

        let event = state.observe(false, t(150));
        assert_eq!(
            event,
            Some(NotificationEvent::AlarmEnd {
                timestamp: t(150),
                duration_seconds: 120
            })
        );
        assert_eq!(state.last_error(), None);
    }

    #[test]
    fn test_error_before_first_observation_stays_unknown() {
        let mut state = AlertState::new();
        state.record_error("Alerts API HTTP 401", t(0));
        assert_eq!(state.phase(), AlertPhase::Unknown);
        assert!(state.observe(true, t(30)).is_none());
    }

    #[test]
    fn test_clock_going_backwards_clamps_duration() {
        let mut state = AlertState::new();
        state.observe(false, t(0));
        state.observe(true, t(100));
        let event = state.observe(false, t(95));
        assert_eq!(
            event,
            Some(NotificationEvent::AlarmEnd {
                timestamp: t(95),
                duration_seconds: 0
            })
        );
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(NotificationEvent::AlarmEnd {
            timestamp: t(0),
            duration_seconds: 60,
        })
        .unwrap();
        assert_eq!(json["kind"], "AlarmEnd");
        assert_eq!(json["durationSeconds"], 60);
    }

    #[test]
    fn test_override_forced_values() {
        assert_eq!(OverrideMode::Auto.forced_value(), None);
        assert_eq!(OverrideMode::ForcedActive.forced_value(), Some(true));
        assert_eq!(OverrideMode::ForcedClear.forced_value(), Some(false));
    }
}
