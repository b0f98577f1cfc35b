//! Environment parsing helpers shared by the per-subsystem config structs

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Parse a numeric variable, falling back to `default` when unset or invalid
pub fn env_parse<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Debug,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, ?default, "Invalid value, using default");
                default
            }
        },
        _ => default,
    }
}

/// Parse a whole-seconds duration, never shorter than one second
pub fn env_duration_secs<F>(lookup: &F, key: &str, default_secs: u64) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    Duration::from_secs(env_parse(lookup, key, default_secs).max(1))
}

/// Read a string variable, treating blank values as unset
pub fn env_string<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
