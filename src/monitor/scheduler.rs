use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

use super::watcher::AlertWatcher;

/// Background worker that ticks the watcher on a fixed period
pub struct PollScheduler {
    watcher: Arc<AlertWatcher>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl PollScheduler {
    pub fn new(watcher: Arc<AlertWatcher>, interval: Duration) -> Self {
        Self {
            watcher,
            interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the background worker; the first tick runs immediately
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            tracing::info!("Poll scheduler started with interval {:?}", self.interval);

            let mut interval = time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            while self.running.load(Ordering::SeqCst) {
                interval.tick().await;
                if !self.running.load(Ordering::SeqCst) {
                    break;
                }
                self.run_once().await;
            }

            tracing::info!("Poll scheduler stopped");
        })
    }

    /// Run a single tick, converting a panic into a recorded error
    async fn run_once(&self) {
        let outcome = AssertUnwindSafe(self.watcher.tick()).catch_unwind().await;
        if let Err(panic) = outcome {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(panic = %message, "Poll tick panicked");
            self.watcher
                .record_error(format!("Poll tick panicked: {}", message));
        }
    }

    /// Stop the worker
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if worker is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MessageTemplates;
    use crate::source::{RegionMatcher, RegionSpec};
    use crate::testing::{odesa_records, RecordingSink, ScriptedSource};

    fn watcher(source: Arc<ScriptedSource>, sink: Arc<RecordingSink>) -> Arc<AlertWatcher> {
        Arc::new(AlertWatcher::new(
            source,
            sink,
            RegionMatcher::new(RegionSpec::default()),
            MessageTemplates::default(),
        ))
    }

    async fn wait_for_calls(source: &ScriptedSource, calls: usize) {
        for _ in 0..200 {
            if source.calls() >= calls {
                return;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        panic!("source reached only {} calls", source.calls());
    }

    #[tokio::test]
    async fn test_scheduler_drives_edges() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(odesa_records(false));
        source.push_ok(odesa_records(true));
        source.push_ok(odesa_records(true));
        let sink = Arc::new(RecordingSink::new());
        let watcher = watcher(Arc::clone(&source), Arc::clone(&sink));

        let scheduler = Arc::new(PollScheduler::new(
            Arc::clone(&watcher),
            Duration::from_millis(20),
        ));
        let handle = Arc::clone(&scheduler).start();
        assert!(scheduler.is_running());

        wait_for_calls(&source, 3).await;
        scheduler.stop();
        handle.await.unwrap();

        assert!(!scheduler.is_running());
        assert_eq!(sink.messages().len(), 1);
        assert_eq!(watcher.snapshot().active, Some(true));
    }

    #[tokio::test]
    async fn test_panicking_tick_does_not_stop_loop() {
        let source = Arc::new(ScriptedSource::panicking());
        let sink = Arc::new(RecordingSink::new());
        let watcher = watcher(Arc::clone(&source), sink);

        let scheduler = Arc::new(PollScheduler::new(
            Arc::clone(&watcher),
            Duration::from_millis(10),
        ));
        let handle = Arc::clone(&scheduler).start();

        wait_for_calls(&source, 3).await;
        scheduler.stop();
        handle.await.unwrap();

        let status = watcher.snapshot();
        assert_eq!(status.active, None);
        assert!(status.last_error.unwrap().contains("scripted source exhausted"));
    }
}
