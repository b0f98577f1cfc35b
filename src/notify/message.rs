//! Message templates for alarm start/end notifications

use crate::config::env_string;
use crate::monitor::NotificationEvent;

pub const DEFAULT_START_TEXT: &str = "🚨 ТРИВОГА в Одеській області!";
pub const DEFAULT_END_TEXT: &str = "✅ Відбій тривоги. Тривалість: {minutes} хв";
pub const PING_TEXT: &str =
    "✅ Bot active (ping). Якщо бачиш це повідомлення — Telegram налаштовано.";

/// Text templates rendered for each [`NotificationEvent`].
///
/// Supported placeholders: `{region}`, `{minutes}`, `{seconds}`, `{duration}`.
/// Duration placeholders render as zero in the start message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    pub start: String,
    pub end: String,
}

impl MessageTemplates {
    /// ALERT_START_TEXT / ALERT_END_TEXT override the defaults
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            start: env_string(&lookup, "ALERT_START_TEXT")
                .unwrap_or_else(|| DEFAULT_START_TEXT.to_string()),
            end: env_string(&lookup, "ALERT_END_TEXT")
                .unwrap_or_else(|| DEFAULT_END_TEXT.to_string()),
        }
    }

    pub fn render(&self, event: &NotificationEvent, region: &str) -> String {
        let (template, seconds) = match event {
            NotificationEvent::AlarmStart { .. } => (&self.start, 0),
            NotificationEvent::AlarmEnd {
                duration_seconds, ..
            } => (&self.end, *duration_seconds),
        };

        template
            .replace("{region}", region)
            .replace("{minutes}", &(seconds / 60).to_string())
            .replace("{seconds}", &seconds.to_string())
            .replace("{duration}", &format_duration(seconds))
    }
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_TEXT.to_string(),
            end: DEFAULT_END_TEXT.to_string(),
        }
    }
}

/// "2 год 5 хв", or just "5 хв" under an hour
pub fn format_duration(seconds: i64) -> String {
    let minutes = seconds.max(0) / 60;
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{} год {} хв", hours, minutes)
    } else {
        format!("{} хв", minutes)
    }
}
