//! Region matcher
//!
//! Reduces a raw alert snapshot to a single boolean for one watched region.

use serde::{Deserialize, Serialize};

use super::record::RawAlertRecord;
use crate::config::env_string;

/// Alert-type tags that denote an air-raid class alert, already folded
const AIR_RAID_TAGS: &[&str] = &["air_raid", "повітряна_тривога"];

/// Watched region description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionSpec {
    /// Canonical oblast substring, e.g. "Одеська"
    pub name: String,
    /// Optional title keywords narrowing the match to a sub-region
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl RegionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keywords: Vec::new(),
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Create a region spec from environment variables
    /// REGION_NAME=Одеська
    /// REGION_KEYWORDS=Одеса,Одеський район
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let name = env_string(&lookup, "REGION_NAME")
            .unwrap_or_else(|| "Одеська".to_string());

        let keywords = lookup("REGION_KEYWORDS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self { name, keywords }
    }
}

impl Default for RegionSpec {
    fn default() -> Self {
        Self::new("Одеська")
    }
}

/// Pre-folded matcher for one [`RegionSpec`]
#[derive(Debug, Clone)]
pub struct RegionMatcher {
    spec: RegionSpec,
    region: String,
    keywords: Vec<String>,
}

impl RegionMatcher {
    pub fn new(spec: RegionSpec) -> Self {
        let region = fold(&spec.name);
        let keywords = spec
            .keywords
            .iter()
            .map(|k| fold(k))
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            spec,
            region,
            keywords,
        }
    }

    pub fn spec(&self) -> &RegionSpec {
        &self.spec
    }

    /// True if any record reports an air-raid alert for the watched region
    pub fn matches(&self, records: &[RawAlertRecord]) -> bool {
        records.iter().any(|r| self.matches_record(r))
    }

    fn matches_record(&self, record: &RawAlertRecord) -> bool {
        if self.region.is_empty() || !is_air_raid(record) {
            return false;
        }

        if !fold(&record.oblast).contains(&self.region) {
            return false;
        }

        if self.keywords.is_empty() {
            return true;
        }

        // An alert titled with the oblast itself covers every sub-region.
        let title = fold(&record.title);
        title == fold(&record.oblast) || self.keywords.iter().any(|k| title.contains(k))
    }
}

fn is_air_raid(record: &RawAlertRecord) -> bool {
    if record.alert_type.is_empty() {
        return record.alert_flag == Some(true);
    }
    let tag = fold(&record.alert_type).replace([' ', '-'], "_");
    AIR_RAID_TAGS.contains(&tag.as_str())
}

/// Lowercase and unify apostrophe variants so Ukrainian names compare equal
fn fold(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{02BC}' | '\u{0060}' | '\u{02B9}' => '\'',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}
