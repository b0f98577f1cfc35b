//! Alert feed access
//!
//! Fetches the raw alert snapshot from the upstream feed and reduces it to a
//! single "is the watched region alerting" answer.

pub mod client;
pub mod matcher;
pub mod record;

use async_trait::async_trait;

pub use client::{AlertsClient, AuthMode, FetchError, SourceConfig};
pub use matcher::{RegionMatcher, RegionSpec};
pub use record::{parse_snapshot, RawAlertRecord};

/// Anything that can produce the current set of active alert records
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Fetch one snapshot of the feed
    async fn fetch_snapshot(&self) -> Result<Vec<RawAlertRecord>, FetchError>;
}
