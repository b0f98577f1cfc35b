//! Alert state monitor
//!
//! Owns the watched region's alert state, turns each poll into at most one
//! notification and runs the polling loop.

pub mod scheduler;
pub mod state;
pub mod watcher;

pub use scheduler::PollScheduler;
pub use state::{AlertPhase, AlertState, NotificationEvent, OverrideMode};
pub use watcher::{AlertWatcher, OverrideReport, StatusSnapshot, TickReport};
