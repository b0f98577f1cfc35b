//! Raidwatch: Regional Air-Raid Alert Watcher
//!
//! Polls a regional alert feed, reduces each snapshot to "is the watched
//! region under an air-raid alert", and posts exactly one chat message per
//! change between clear and active, including how long each alert lasted.
//!
//! # Components
//!
//! - **Alert source**: HTTP client for the feed with tolerant payload decoding
//! - **Region matcher**: air-raid + oblast + optional sub-region keywords
//! - **State monitor**: `Unknown → Clear ⇄ Active` edge detection with timing
//! - **Poll scheduler**: fixed-period background loop isolated from failures
//! - **Notification sink**: Telegram Bot API `sendMessage`
//! - **HTTP surface**: liveness, status, manual check and test overrides
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use raidwatch::monitor::{AlertState, NotificationEvent};
//!
//! let mut state = AlertState::new();
//! let t0 = Utc::now();
//!
//! // The first observation only seeds the state
//! assert!(state.observe(false, t0).is_none());
//! assert!(matches!(
//!     state.observe(true, t0),
//!     Some(NotificationEvent::AlarmStart { .. })
//! ));
//! ```

pub mod api;
pub mod config;
pub mod monitor;
pub mod notify;
pub mod source;
pub mod text;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use monitor::{AlertState, AlertWatcher, NotificationEvent, OverrideMode, PollScheduler};
pub use notify::{NotificationSink, SendError};
pub use source::{AlertSource, FetchError, RegionMatcher, RegionSpec};
