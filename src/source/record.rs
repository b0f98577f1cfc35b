//! Raw alert records and defensive decoding of feed payloads

use serde::Serialize;
use serde_json::Value;

use super::client::FetchError;

/// Keys under which an object-shaped payload may wrap the record list
const WRAPPER_KEYS: &[&str] = &["alerts", "regions"];

const OBLAST_KEYS: &[&str] = &["location_oblast", "oblast", "region", "name"];
const TITLE_KEYS: &[&str] = &["location_title", "title", "name"];
const ALERT_TYPE_KEYS: &[&str] = &["alert_type", "type"];

/// One alert record from the feed, with every field defaulted to empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawAlertRecord {
    /// Oblast label, e.g. "Одеська область"
    pub oblast: String,
    /// Location title (oblast, raion, city or hromada name)
    pub title: String,
    /// Alert class tag, e.g. "air_raid"
    pub alert_type: String,
    /// Boolean flag used by the older region-list payload
    pub alert_flag: Option<bool>,
}

impl RawAlertRecord {
    /// Build a record from an arbitrary JSON value.
    ///
    /// Non-object values and missing or oddly typed fields all decode to
    /// empty strings; this never fails.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let field = |keys: &[&str]| -> String {
            keys.iter()
                .filter_map(|k| obj.get(*k))
                .map(scalar_to_string)
                .find(|s| !s.is_empty())
                .unwrap_or_default()
        };

        Self {
            oblast: field(OBLAST_KEYS),
            title: field(TITLE_KEYS),
            alert_type: field(ALERT_TYPE_KEYS),
            alert_flag: obj.get("alert").and_then(Value::as_bool),
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Normalize a feed response body into a record list.
///
/// Accepts either a bare JSON array or an object wrapping the array under one
/// of the known keys. Anything else is [`FetchError::Malformed`].
pub fn parse_snapshot(body: &str) -> Result<Vec<RawAlertRecord>, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("invalid JSON: {}", e)))?;

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(obj) => WRAPPER_KEYS
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_array))
            .ok_or_else(|| {
                FetchError::Malformed(format!(
                    "object payload has none of the keys {:?}",
                    WRAPPER_KEYS
                ))
            })?,
        other => {
            return Err(FetchError::Malformed(format!(
                "expected array or object, got {}",
                json_kind(other)
            )))
        }
    };

    Ok(items.iter().map(RawAlertRecord::from_value).collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
