//! Test doubles for the feed and the messaging sink

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::notify::{NotificationSink, SendError};
use crate::source::{AlertSource, FetchError, RawAlertRecord};

/// Feed that replays queued responses, then fails once the queue runs dry
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<RawAlertRecord>, FetchError>>>,
    calls: AtomicUsize,
    panic_on_empty: bool,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panics instead of failing when nothing is queued
    pub fn panicking() -> Self {
        Self {
            panic_on_empty: true,
            ..Self::default()
        }
    }

    /// Sleeps for `delay` before answering each fetch
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push_ok(&self, records: Vec<RawAlertRecord>) {
        self.script.lock().push_back(Ok(records));
    }

    pub fn push_err(&self) {
        self.script
            .lock()
            .push_back(Err(FetchError::Network("connection reset by peer".to_string())));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertSource for ScriptedSource {
    async fn fetch_snapshot(&self) -> Result<Vec<RawAlertRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().pop_front();
        match next {
            Some(result) => result,
            None if self.panic_on_empty => panic!("scripted source exhausted"),
            None => Err(FetchError::Network("script exhausted".to_string())),
        }
    }
}

/// Sink that records every message it is asked to send
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every message
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, text: &str) -> Result<(), SendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SendError::Rejected {
                status: 403,
                payload: r#"{"ok":false,"description":"Forbidden: bot was kicked"}"#.to_string(),
            });
        }
        self.messages.lock().push(text.to_string());
        Ok(())
    }
}

/// A feed snapshot with an unrelated region, plus Odesa oblast when `active`
pub fn odesa_records(active: bool) -> Vec<RawAlertRecord> {
    let record = |oblast: &str| RawAlertRecord {
        oblast: oblast.to_string(),
        title: oblast.to_string(),
        alert_type: "air_raid".to_string(),
        alert_flag: None,
    };

    let mut records = vec![record("Харківська область")];
    if active {
        records.push(record("Одеська область"));
    }
    records
}
